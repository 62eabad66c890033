/**********************************************
  > File Name		: errors.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue 02 Mar 2021 11:05:17 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Define some erros enum for global usage.
 *
 * Not-found conditions are never errors, they are reported as
 * Ok(None) by the file operations. Everything in here is either
 * malformed input handed to us by the caller or a failure that
 * may have left the file in a state the caller doesn't expect.
 */

use std::io;
use thiserror::Error;

use crate::block_management::Address;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record buffer too small: expected {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },
    #[error("record field {field} holds {len} bytes, at most {max} allowed")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("block buffer too small: expected {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },
    #[error("invalid blocking factor {0}")]
    InvalidFactor(i64),
    #[error("valid count {valid_count} outside of [0, {factor}]")]
    InvalidValidCount { valid_count: i64, factor: usize },
    #[error("block stores factor {found}, file uses {expected}")]
    FactorMismatch { expected: usize, found: i64 },
    #[error("invalid record in block: {0}")]
    Record(#[from] RecordError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("blocking factor must be in [1, {max}], got {factor}")]
    InvalidFactor { factor: usize, max: usize },
    #[error("maximum directory size must be a power of two >= 2, got {0}")]
    InvalidDirectorySize(usize),
}

#[derive(Debug, Error)]
pub enum HeapFileError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Block(#[from] BlockError),
    //a write that didn't make it to disk, the file can't be trusted anymore.
    #[error("write of block {address} failed: {source}")]
    WriteFailed { address: Address, source: io::Error },
    #[error("block {address} is not a multiple of the block size {block_size}")]
    MisalignedAddress { address: Address, block_size: usize },
    #[error("truncating file to {length} bytes failed: {source}")]
    TruncateFailed { length: u64, source: io::Error },
    #[error("cannot create block file: {0}")]
    Create(io::Error),
    //returns when a list pointer leads to a block we cannot read.
    #[error("broken list link: block {address} is unreadable")]
    BrokenLink { address: Address },
    #[error("offset {0} does not fit in a 32 bit block address")]
    AddressOverflow(u64),
}

#[derive(Debug, Error)]
pub enum IndexingError {
    #[error(transparent)]
    HeapFile(#[from] HeapFileError),
    #[error("block {address} has local depth {local_depth}, directory allows at most {max}")]
    DepthOutOfRange {
        address: Address,
        local_depth: u32,
        max: u32,
    },
}

impl From<BlockError> for IndexingError {
    fn from(e: BlockError) -> Self {
        IndexingError::HeapFile(HeapFileError::Block(e))
    }
}
