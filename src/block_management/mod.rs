/**********************************************
  > File Name		: mod.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue 02 Mar 2021 10:31:37 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * The block management component provides fixed size blocks of
 * records, their binary layout, and the I/O and caching that the
 * file organizations above it are built on.
 */

pub mod block;
pub mod block_cache;
pub mod block_file;

pub use block::{Address, Block, BlockKind, ListKind};
pub use block_cache::BlockCache;
pub use block_file::BlockFile;
