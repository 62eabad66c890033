/**********************************************
  > File Name		: customer.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Sun 16 May 2021 03:12:54 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * A customer together with the services performed for them.
 *
 * Customer layout:
 * id (4) | name (1 + 15) | surname (1 + 20) | services count (1) |
 * MAX_SERVICES service slots of Service::SIZE bytes.
 *
 * Unlike the strings, services are never cut silently: adding one
 * more than MAX_SERVICES is refused.
 */

use std::fmt;

use super::service::Service;
use crate::errors::RecordError;
use crate::record_management::{record, Record};
use crate::utils;

pub const MAX_NAME_LEN: usize = 15;
pub const MAX_SURNAME_LEN: usize = 20;
pub const MAX_SERVICES: usize = 5;

const NAME_OFFSET: usize = 4;
const SURNAME_OFFSET: usize = NAME_OFFSET + 1 + MAX_NAME_LEN;
const COUNT_OFFSET: usize = SURNAME_OFFSET + 1 + MAX_SURNAME_LEN;
const SERVICES_OFFSET: usize = COUNT_OFFSET + 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub surname: String,
    services: Vec<Service>,
}

impl Customer {
    pub fn new(id: i32, name: &str, surname: &str) -> Self {
        Self {
            id,
            name: utils::ascii_truncate(name, MAX_NAME_LEN),
            surname: utils::ascii_truncate(surname, MAX_SURNAME_LEN),
            services: Vec::new(),
        }
    }

    //a key carrying only the id, enough for find and delete.
    pub fn key(id: i32) -> Self {
        Self::new(id, "", "")
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn add_service(&mut self, service: Service) -> Result<(), RecordError> {
        if self.services.len() >= MAX_SERVICES {
            return Err(RecordError::FieldTooLong {
                field: "services",
                len: self.services.len() + 1,
                max: MAX_SERVICES,
            });
        }
        self.services.push(service);
        Ok(())
    }
}

impl Record for Customer {
    const SIZE: usize = SERVICES_OFFSET + MAX_SERVICES * Service::SIZE;

    fn id(&self) -> i32 {
        self.id
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0u8; Self::SIZE];
        utils::write_i32(&mut data, 0, self.id);
        utils::write_str_field(&mut data, NAME_OFFSET, &self.name, MAX_NAME_LEN);
        utils::write_str_field(&mut data, SURNAME_OFFSET, &self.surname, MAX_SURNAME_LEN);

        let count = self.services.len().min(MAX_SERVICES);
        data[COUNT_OFFSET] = count as u8;
        for (i, service) in self.services.iter().take(count).enumerate() {
            let offset = SERVICES_OFFSET + i * Service::SIZE;
            data[offset..offset + Service::SIZE].copy_from_slice(&service.to_bytes());
        }
        data
    }

    fn from_bytes(data: &[u8]) -> Result<Self, RecordError> {
        record::check_size::<Self>(data)?;
        let count = (data[COUNT_OFFSET] as usize).min(MAX_SERVICES);
        let mut services = Vec::with_capacity(count);
        for i in 0..count {
            let offset = SERVICES_OFFSET + i * Service::SIZE;
            services.push(Service::from_bytes(&data[offset..offset + Service::SIZE])?);
        }
        Ok(Self {
            id: utils::read_i32(data, 0),
            name: utils::read_str_field(data, NAME_OFFSET, MAX_NAME_LEN),
            surname: utils::read_str_field(data, SURNAME_OFFSET, MAX_SURNAME_LEN),
            services,
        })
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Customer - {} {}:", self.name, self.surname)?;
        for service in self.services.iter() {
            write!(f, "\n  {}", service)?;
        }
        Ok(())
    }
}
