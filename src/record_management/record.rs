/**********************************************
  > File Name		: record.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 12 Apr 2021 10:31:05 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

use std::fmt::Debug;

use crate::errors::RecordError;

/*
 * Everything a block needs to know about the records it stores.
 *
 * Every record of a type serializes into exactly SIZE bytes, so
 * a block can reserve a fixed slot for each one and the file can
 * compute block addresses with plain arithmetic.
 *
 * Two records are the same record when their ids are equal, the
 * rest of the fields don't take part in lookups.
 */
pub trait Record: Clone + Debug {
    /// Serialized length in bytes, independent of the record content.
    const SIZE: usize;

    fn id(&self) -> i32;

    /// Writes exactly `SIZE` bytes.
    fn to_bytes(&self) -> Vec<u8>;

    /// Fails when `data` is shorter than `SIZE`, extra bytes are ignored.
    fn from_bytes(data: &[u8]) -> Result<Self, RecordError>;

    fn equals_by_id(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Hash used to route the record to a bucket.
    fn hash_code(&self) -> u32 {
        self.id() as u32
    }
}

//the length check every from_bytes implementation starts with.
pub fn check_size<R: Record>(data: &[u8]) -> Result<(), RecordError> {
    if data.len() < R::SIZE {
        return Err(RecordError::BufferTooSmall {
            expected: R::SIZE,
            actual: data.len(),
        });
    }
    Ok(())
}
