/**********************************************
  > File Name		: block.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 01 Mar 2021 07:31:48 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Introduction:
 *
 * A block is one fixed size page of a record file. All blocks of
 * a file have the same size, so a block is addressed by its byte
 * offset inside the file and the offset of the n-th block is just
 * n * block_size.
 *
 * Block layout on disk, every integer is a little endian i32:
 *
 *   0  : address
 *   4  : previous address
 *   8  : next address
 *   12 : valid count
 *   16 : factor          (hash blocks only)
 *   20 : local depth     (hash blocks only)
 *   H  : factor record slots of Record::SIZE bytes each.
 *
 * Slots [0, valid count) hold live records, the rest are zeroed.
 * Unused slots are always written out, so a block occupies the same
 * number of bytes whatever its occupancy.
 */

use std::fmt;

use crate::errors::{BlockError, RecordError};
use crate::record_management::Record;
use crate::utils;

/*
 * Byte offset of a block inside its file.
 * Addresses double as the pointers of the on-disk lists and the
 * entries of the hash directory, -1 (NULL) points nowhere.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(i32);

impl Address {
    pub const NULL: Address = Address(-1);

    pub fn new(raw: i32) -> Self {
        Address(raw)
    }

    pub fn from_offset(offset: u64) -> Option<Self> {
        if offset > i32::MAX as u64 {
            return None;
        }
        Some(Address(offset as i32))
    }

    pub fn raw(&self) -> i32 {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 < 0
    }

    pub fn offset(&self) -> Option<u64> {
        if self.is_null() {
            None
        } else {
            Some(self.0 as u64)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heap,
    Hash,
}

impl BlockKind {
    pub fn header_size(&self) -> usize {
        match self {
            BlockKind::Heap => 16,
            BlockKind::Hash => 24,
        }
    }
}

//which of the two free space lists a block at rest belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    PartiallyFull,
    Full,
}

#[derive(Debug, Clone)]
pub struct Block<T: Record> {
    pub address: Address,
    pub previous: Address,
    pub next: Address,
    pub factor: usize,
    pub local_depth: u32, //only meaningful in hash blocks.
    pub records: Vec<T>,
    kind: BlockKind,
}

impl<T: Record> Block<T> {
    pub fn new(kind: BlockKind, address: Address, factor: usize, local_depth: u32) -> Self {
        Self {
            address,
            previous: Address::NULL,
            next: Address::NULL,
            factor,
            local_depth,
            records: Vec::new(),
            kind,
        }
    }

    pub fn size_of(kind: BlockKind, factor: usize) -> usize {
        kind.header_size() + factor * T::SIZE
    }

    /*
     * Block size for a factor, None when a block that large can't be
     * addressed with a 32 bit offset.
     */
    pub fn checked_size_of(kind: BlockKind, factor: usize) -> Option<usize> {
        let size = factor.checked_mul(T::SIZE)?.checked_add(kind.header_size())?;
        if size > i32::MAX as usize {
            None
        } else {
            Some(size)
        }
    }

    //largest factor whose blocks checked_size_of accepts.
    pub fn max_factor(kind: BlockKind) -> usize {
        (i32::MAX as usize - kind.header_size()) / T::SIZE.max(1)
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn valid_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.factor
    }

    //only transiently true, between an insert and the split resolving it.
    pub fn is_overflowing(&self) -> bool {
        self.records.len() > self.factor
    }

    pub fn list_kind(&self) -> ListKind {
        if self.is_full() {
            ListKind::Full
        } else {
            ListKind::PartiallyFull
        }
    }

    pub fn position_of(&self, key: &T) -> Option<usize> {
        self.records.iter().position(|r| r.equals_by_id(key))
    }

    pub fn size(&self) -> usize {
        Self::size_of(self.kind, self.factor)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, BlockError> {
        if self.factor == 0 {
            return Err(BlockError::InvalidFactor(0));
        }
        if self.is_overflowing() {
            return Err(BlockError::InvalidValidCount {
                valid_count: self.records.len() as i64,
                factor: self.factor,
            });
        }

        let mut data = vec![0u8; self.size()];
        utils::write_i32(&mut data, 0, self.address.raw());
        utils::write_i32(&mut data, 4, self.previous.raw());
        utils::write_i32(&mut data, 8, self.next.raw());
        utils::write_i32(&mut data, 12, self.records.len() as i32);
        if self.kind == BlockKind::Hash {
            utils::write_i32(&mut data, 16, self.factor as i32);
            utils::write_i32(&mut data, 20, self.local_depth as i32);
        }

        let mut offset = self.kind.header_size();
        for record in self.records.iter() {
            let bytes = record.to_bytes();
            if bytes.len() < T::SIZE {
                return Err(BlockError::Record(RecordError::BufferTooSmall {
                    expected: T::SIZE,
                    actual: bytes.len(),
                }));
            }
            data[offset..offset + T::SIZE].copy_from_slice(&bytes[..T::SIZE]);
            offset += T::SIZE;
        }
        Ok(data)
    }

    /*
     * Decode a block of a file with the given kind and factor.
     * Padding slots are read along with the live ones to keep the
     * block size fixed, but only the first valid_count records are
     * decoded.
     */
    pub fn from_bytes(kind: BlockKind, factor: usize, data: &[u8]) -> Result<Self, BlockError> {
        if factor == 0 {
            return Err(BlockError::InvalidFactor(0));
        }
        let header_size = kind.header_size();
        if data.len() < header_size {
            return Err(BlockError::BufferTooSmall {
                expected: header_size,
                actual: data.len(),
            });
        }

        let address = Address::new(utils::read_i32(data, 0));
        let previous = Address::new(utils::read_i32(data, 4));
        let next = Address::new(utils::read_i32(data, 8));
        let valid_count = utils::read_i32(data, 12) as i64;

        let mut local_depth = 0;
        if kind == BlockKind::Hash {
            let stored = utils::read_i32(data, 16) as i64;
            if stored <= 0 {
                return Err(BlockError::InvalidFactor(stored));
            }
            if stored != factor as i64 {
                return Err(BlockError::FactorMismatch {
                    expected: factor,
                    found: stored,
                });
            }
            local_depth = utils::read_i32(data, 20).max(0) as u32;
        }

        if valid_count < 0 || valid_count > factor as i64 {
            return Err(BlockError::InvalidValidCount { valid_count, factor });
        }

        let expected = Self::size_of(kind, factor);
        if data.len() < expected {
            return Err(BlockError::BufferTooSmall {
                expected,
                actual: data.len(),
            });
        }

        let mut block = Self {
            address,
            previous,
            next,
            factor,
            local_depth,
            records: Vec::with_capacity(valid_count as usize),
            kind,
        };
        for i in 0..(valid_count as usize) {
            let offset = header_size + i * T::SIZE;
            block.records.push(T::from_bytes(&data[offset..offset + T::SIZE])?);
        }
        Ok(block)
    }
}

impl<T: Record> fmt::Display for Block<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block [#{}] prev={} next={} valid={}/{}",
            self.address,
            self.previous,
            self.next,
            self.records.len(),
            self.factor
        )?;
        if self.kind == BlockKind::Hash {
            write!(f, " depth={}", self.local_depth)?;
        }
        for record in self.records.iter() {
            write!(f, "\n  {:?}", record)?;
        }
        Ok(())
    }
}
