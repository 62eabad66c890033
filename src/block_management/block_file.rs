/**********************************************
  > File Name		: block_file.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue 02 Mar 2021 10:31:37 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Block I/O on the backing file.
 *
 * No file handle is kept open: every read or write opens the file,
 * does one positioned read or write and closes it again. This keeps
 * a BlockFile trivially movable, but means nobody else may touch the
 * file while we use it.
 *
 * A read that fails for any I/O reason is reported as "no block",
 * a write that fails is an error. A block that was read completely
 * but doesn't decode is malformed input and also an error.
 */

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};

use super::block::{Address, Block, BlockKind};
use crate::errors::{BlockError, HeapFileError};
use crate::record_management::Record;

#[derive(Debug, Clone)]
pub struct BlockFile {
    path: PathBuf,
    kind: BlockKind,
    factor: usize,
    block_size: usize,
}

impl BlockFile {
    pub fn new<T: Record>(path: &Path, kind: BlockKind, factor: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
            factor,
            block_size: Block::<T>::size_of(kind, factor),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn factor(&self) -> usize {
        self.factor
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    //create an empty file, dropping whatever was stored there.
    pub fn create(&self) -> Result<(), HeapFileError> {
        File::create(&self.path).map_err(HeapFileError::Create)?;
        Ok(())
    }

    pub fn len(&self) -> Option<u64> {
        fs::metadata(&self.path).ok().map(|m| m.len())
    }

    pub fn read<T: Record>(&self, address: Address) -> Result<Option<Block<T>>, BlockError> {
        let offset = match address.offset() {
            Some(v) => v,
            None => return Ok(None),
        };
        if offset % self.block_size as u64 != 0 {
            debug!("Address {} is not on a block boundary", address);
            return Ok(None);
        }
        let fp = match File::open(&self.path) {
            Ok(v) => v,
            Err(e) => {
                warn!("Cannot open {} for reading: {}", self.path.display(), e);
                return Ok(None);
            }
        };

        let mut data = vec![0u8; self.block_size];
        if let Err(e) = fp.read_exact_at(&mut data, offset) {
            match e.kind() {
                ErrorKind::UnexpectedEof => {
                    debug!("Block {} lies beyond the end of file", address);
                }
                _ => {
                    warn!("Reading block {} failed: {}", address, e);
                }
            }
            return Ok(None);
        }

        debug!("Read block {} from file", address);
        Block::from_bytes(self.kind, self.factor, &data).map(Some)
    }

    pub fn write<T: Record>(&self, block: &Block<T>) -> Result<(), HeapFileError> {
        let address = block.address;
        let offset = address
            .offset()
            .ok_or(HeapFileError::BrokenLink { address })?;
        if offset % self.block_size as u64 != 0 {
            error!("Refusing to write block {} off a block boundary", address);
            return Err(HeapFileError::MisalignedAddress {
                address,
                block_size: self.block_size,
            });
        }
        let data = block.to_bytes()?;

        let fp = OpenOptions::new()
            .write(true)
            .create(true)
            .open(&self.path)
            .map_err(|source| {
                error!("Cannot open {} for writing: {}", self.path.display(), source);
                HeapFileError::WriteFailed { address, source }
            })?;
        fp.write_all_at(&data, offset).map_err(|source| {
            error!("Writing block {} failed: {}", address, source);
            HeapFileError::WriteFailed { address, source }
        })?;

        debug!("Wrote block {} to file", address);
        Ok(())
    }

    pub fn truncate(&self, length: u64) -> Result<(), HeapFileError> {
        let fp = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|source| HeapFileError::TruncateFailed { length, source })?;
        fp.set_len(length).map_err(|source| {
            error!("Truncating {} failed: {}", self.path.display(), source);
            HeapFileError::TruncateFailed { length, source }
        })
    }
}
