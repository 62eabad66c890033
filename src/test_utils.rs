/**********************************************
  > File Name		: test_utils.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 17 May 2021 08:47:30 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Shared helpers for unit tests.
 */

use std::path::PathBuf;

use tempfile::TempDir;

use crate::errors::RecordError;
use crate::record_management::{record, Record};
use crate::utils;

/*
 * A tiny record whose hash is its id, so tests decide which bucket
 * a record goes to.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: i32,
    pub value: i32,
}

impl Item {
    pub fn new(id: i32) -> Self {
        Self { id, value: id * 100 }
    }
}

impl Record for Item {
    const SIZE: usize = 8;

    fn id(&self) -> i32 {
        self.id
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0u8; Self::SIZE];
        utils::write_i32(&mut data, 0, self.id);
        utils::write_i32(&mut data, 4, self.value);
        data
    }

    fn from_bytes(data: &[u8]) -> Result<Self, RecordError> {
        record::check_size::<Self>(data)?;
        Ok(Self {
            id: utils::read_i32(data, 0),
            value: utils::read_i32(data, 4),
        })
    }
}

pub fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

//the directory must outlive the file, keep it around.
pub fn scratch_file(name: &str) -> (TempDir, PathBuf) {
    init_log();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}

pub fn file_len(path: &PathBuf) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
