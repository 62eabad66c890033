/**********************************************
  > File Name		: lib.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue 02 Mar 2021 10:28:03 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

#[macro_use]
mod macros;

pub mod block_management;
pub mod config;
pub mod errors;
pub mod indexing;
pub mod record_management;
pub mod records;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use block_management::{Address, Block, BlockKind};
pub use config::FileConfig;
pub use errors::{BlockError, ConfigError, HeapFileError, IndexingError, RecordError};
pub use indexing::ExtendibleHashFile;
pub use record_management::{HeapFile, Record};
