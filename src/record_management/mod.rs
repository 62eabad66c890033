/**********************************************
  > File Name		: mod.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time     : Wed Mar 10 07:25:33 PM CST 2021
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * The Record Management component provides methods for managing
 * files of unordered records.
 *
 * Records are stored in the fixed size blocks provided by the
 * block management component. To simplify our task, we assume that
 * every record in one file has the same size, so a block is just a
 * header followed by factor record slots.
 */

pub mod heap_file;
pub mod record;

pub use heap_file::HeapFile;
pub use record::Record;
