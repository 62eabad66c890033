/**********************************************
  > File Name		: service.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Sun 16 May 2021 03:40:11 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Service layout: id (4) | date (4) | cost (8) | description (1 + 20).
 */

use std::fmt;

use crate::errors::RecordError;
use crate::record_management::{record, Record};
use crate::utils;

pub const MAX_DESCRIPTION_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: i32,
    pub date: i32,
    pub cost: f64,
    pub description: String,
}

impl Service {
    pub fn new(id: i32, date: i32, cost: f64, description: &str) -> Self {
        Self {
            id,
            date,
            cost,
            description: utils::ascii_truncate(description, MAX_DESCRIPTION_LEN),
        }
    }
}

impl Record for Service {
    const SIZE: usize = 4 + 4 + 8 + 1 + MAX_DESCRIPTION_LEN;

    fn id(&self) -> i32 {
        self.id
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0u8; Self::SIZE];
        utils::write_i32(&mut data, 0, self.id);
        utils::write_i32(&mut data, 4, self.date);
        utils::write_f64(&mut data, 8, self.cost);
        utils::write_str_field(&mut data, 16, &self.description, MAX_DESCRIPTION_LEN);
        data
    }

    fn from_bytes(data: &[u8]) -> Result<Self, RecordError> {
        record::check_size::<Self>(data)?;
        Ok(Self {
            id: utils::read_i32(data, 0),
            date: utils::read_i32(data, 4),
            cost: utils::read_f64(data, 8),
            description: utils::read_str_field(data, 16, MAX_DESCRIPTION_LEN),
        })
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Service - Date: {}, Cost: {:.2}, Desc: {}",
            self.date, self.cost, self.description
        )
    }
}
