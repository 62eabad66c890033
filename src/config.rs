/**********************************************
  > File Name		: config.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Sat 15 May 2021 09:12:40 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Parameters fixed at file creation time.
 *
 * factor: max number of records a block holds, the same for every
 * block of a file.
 * cache_limit: max number of blocks kept in memory, 0 disables the
 * cache.
 * max_directory_size: upper bound of the hash directory length, the
 * directory refuses to double past it.
 */

use crate::errors::ConfigError;

pub const DEFAULT_FACTOR: usize = 4;
pub const DEFAULT_CACHE_LIMIT: usize = 16;
pub const DEFAULT_MAX_DIRECTORY_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileConfig {
    pub factor: usize,
    pub cache_limit: usize,
    pub max_directory_size: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            factor: DEFAULT_FACTOR,
            cache_limit: DEFAULT_CACHE_LIMIT,
            max_directory_size: DEFAULT_MAX_DIRECTORY_SIZE,
        }
    }
}

impl FileConfig {
    pub fn new(factor: usize) -> Self {
        Self {
            factor,
            ..Self::default()
        }
    }

    pub fn with_cache_limit(mut self, cache_limit: usize) -> Self {
        self.cache_limit = cache_limit;
        self
    }

    pub fn with_max_directory_size(mut self, max_directory_size: usize) -> Self {
        self.max_directory_size = max_directory_size;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = i32::MAX as usize;
        if self.factor == 0 || self.factor > max {
            return Err(ConfigError::InvalidFactor {
                factor: self.factor,
                max,
            });
        }
        if self.max_directory_size < 2 || !self.max_directory_size.is_power_of_two() {
            return Err(ConfigError::InvalidDirectorySize(self.max_directory_size));
        }
        Ok(())
    }
}
