/**********************************************
  > File Name		: block_cache.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 01 Mar 2021 07:52:27 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

use std::collections::{HashMap, VecDeque};

use log::debug;

use super::block::{Address, Block};
use crate::record_management::Record;

/*
 * Bounded map from block address to the last version of the block
 * we read or wrote.
 *
 * The cache never holds anything the file doesn't: the file writes
 * through to disk first and only then updates the cache, so a
 * cached block is always identical to its on-disk image.
 *
 * When the cache is full the block that was inserted first is
 * evicted. Hits don't refresh a block's position, this is a FIFO,
 * not an LRU.
 */
#[derive(Debug)]
pub struct BlockCache<T: Record> {
    capacity: usize,
    blocks: HashMap<Address, Block<T>>,
    order: VecDeque<Address>, //insertion order, front is the oldest.
}

impl<T: Record> BlockCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            blocks: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.blocks.contains_key(&address)
    }

    pub fn get(&self, address: Address) -> Option<&Block<T>> {
        self.blocks.get(&address)
    }

    /*
     * Insert or replace a block.
     * Replacing keeps the block's place in the eviction order.
     */
    pub fn put(&mut self, block: Block<T>) {
        if self.capacity == 0 {
            return;
        }
        let address = block.address;
        if let Some(cached) = self.blocks.get_mut(&address) {
            *cached = block;
            return;
        }
        if self.blocks.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                debug!("Evicting block {} from cache", oldest);
                self.blocks.remove(&oldest);
            }
        }
        self.order.push_back(address);
        self.blocks.insert(address, block);
    }

    pub fn invalidate(&mut self, address: Address) {
        if self.blocks.remove(&address).is_some() {
            self.order.retain(|a| *a != address);
        }
    }

    //drop every block at or behind an offset, used when the file shrinks.
    pub fn invalidate_from(&mut self, offset: u64) {
        let stale: Vec<Address> = self
            .blocks
            .keys()
            .filter(|a| a.offset().map_or(false, |o| o >= offset))
            .copied()
            .collect();
        for address in stale {
            self.invalidate(address);
        }
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.order.clear();
    }
}
