/**********************************************
  > File Name		: heap_file.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 12 Apr 2021 11:01:57 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * A heap file stores unordered records in fixed size blocks.
 *
 * Free space is tracked by two doubly linked lists threaded through
 * the previous/next fields of the blocks themselves:
 *   - the partially full list: blocks with at least one free slot,
 *   - the full list: blocks holding factor records.
 * Every block of the file is in exactly one of them while no
 * operation is running, so the number of blocks in the file is the
 * sum of both list lengths and the next free offset (seek) follows
 * from it without any free space map.
 *
 * New records go into the head of the partially full list, a new
 * block is appended at seek() when that list is empty.
 * Emptied blocks stay in the partially full list and get reused,
 * only empty blocks at the tail of the file are unlinked and the
 * file truncated.
 *
 * Every block read goes through the cache first, every write goes
 * to disk and then to the cache.
 */

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};

use crate::block_management::{Address, Block, BlockCache, BlockFile, BlockKind, ListKind};
use crate::config::FileConfig;
use crate::errors::{ConfigError, HeapFileError};
use crate::record_management::Record;

#[derive(Debug)]
pub struct HeapFile<T: Record> {
    file: BlockFile,
    cache: BlockCache<T>,
    config: FileConfig,
    first_partially_full: Address,
    first_full: Address,
    partially_full_count: usize,
    full_count: usize,
}

impl<T: Record> HeapFile<T> {
    /*
     * Create a new empty file at path, an existing file is truncated.
     */
    pub fn create<P: AsRef<Path>>(path: P, config: FileConfig) -> Result<Self, HeapFileError> {
        Self::create_with_kind(path.as_ref(), config, BlockKind::Heap)
    }

    /*
     * Open an existing file, the free space lists are rebuilt from the
     * blocks on disk. A missing file is opened as an empty one.
     */
    pub fn open<P: AsRef<Path>>(path: P, config: FileConfig) -> Result<Self, HeapFileError> {
        Self::open_with_kind(path.as_ref(), config, BlockKind::Heap)
    }

    pub(crate) fn create_with_kind(
        path: &Path,
        config: FileConfig,
        kind: BlockKind,
    ) -> Result<Self, HeapFileError> {
        Self::check_config(&config, kind)?;
        let file = BlockFile::new::<T>(path, kind, config.factor);
        file.create()?;
        info!(
            "Created {:?} file {} with factor={}, block size={}",
            kind,
            path.display(),
            config.factor,
            file.block_size()
        );
        Ok(Self::with_file(file, config))
    }

    pub(crate) fn open_with_kind(
        path: &Path,
        config: FileConfig,
        kind: BlockKind,
    ) -> Result<Self, HeapFileError> {
        Self::check_config(&config, kind)?;
        let file = BlockFile::new::<T>(path, kind, config.factor);
        if file.len().is_none() {
            file.create()?;
        }
        let mut heap = Self::with_file(file, config);
        heap.rebuild_lists()?;
        info!(
            "Opened {:?} file {}: {} partially full and {} full blocks",
            kind,
            path.display(),
            heap.partially_full_count,
            heap.full_count
        );
        Ok(heap)
    }

    //the factor must also give blocks that fit the 32 bit address space.
    fn check_config(config: &FileConfig, kind: BlockKind) -> Result<(), HeapFileError> {
        config.validate()?;
        if Block::<T>::checked_size_of(kind, config.factor).is_none() {
            return Err(ConfigError::InvalidFactor {
                factor: config.factor,
                max: Block::<T>::max_factor(kind),
            }
            .into());
        }
        Ok(())
    }

    fn with_file(file: BlockFile, config: FileConfig) -> Self {
        Self {
            file,
            cache: BlockCache::new(config.cache_limit),
            config,
            first_partially_full: Address::NULL,
            first_full: Address::NULL,
            partially_full_count: 0,
            full_count: 0,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn config(&self) -> &FileConfig {
        &self.config
    }

    pub fn factor(&self) -> usize {
        self.config.factor
    }

    pub fn block_size(&self) -> usize {
        self.file.block_size()
    }

    pub fn first_partially_full(&self) -> Address {
        self.first_partially_full
    }

    pub fn first_full(&self) -> Address {
        self.first_full
    }

    pub fn partially_full_count(&self) -> usize {
        self.partially_full_count
    }

    pub fn full_count(&self) -> usize {
        self.full_count
    }

    pub fn block_count(&self) -> usize {
        self.partially_full_count + self.full_count
    }

    pub fn cache(&self) -> &BlockCache<T> {
        &self.cache
    }

    /*
     * Offset of the next block to allocate.
     */
    pub fn seek(&self) -> u64 {
        (self.block_count() * self.block_size()) as u64
    }

    /*
     * Insert a record into the first partially full block, or into a
     * freshly allocated one. Returns the address of the block the
     * record went into.
     */
    pub fn insert_record(&mut self, record: T) -> Result<Option<Address>, HeapFileError> {
        loop {
            let head = self.first_partially_full;
            let mut block = if head.is_null() {
                self.allocate_block(0)?
            } else {
                some_or_return!(
                    self.read_block(head)?,
                    "Head of partially full list {} is unreadable",
                    head
                )
            };

            if block.is_full() {
                warn!(
                    "Block {} is full but sits in the partially full list",
                    block.address
                );
                self.unlink(block.address, ListKind::PartiallyFull)?;
                self.link(block.address, ListKind::Full)?;
                continue;
            }

            block.records.push(record);
            let address = block.address;
            debug!("Inserting record into block {}", address);
            self.commit(block, ListKind::PartiallyFull)?;
            return Ok(Some(address));
        }
    }

    /*
     * Follow the next pointers from start looking for a block that
     * holds a record with the key's id.
     */
    pub fn find_record(&mut self, start: Address, key: &T) -> Result<Option<Address>, HeapFileError> {
        let mut address = start;
        let mut visited = 0;
        while !address.is_null() {
            if visited > self.block_count() {
                warn!("Cycle detected in list starting at {}", start);
                return Ok(None);
            }
            let block = some_or_return!(
                self.read_block(address)?,
                "Block {} is unreadable, search stopped",
                address
            );
            if block.position_of(key).is_some() {
                return Ok(Some(address));
            }
            address = block.next;
            visited += 1;
        }
        Ok(None)
    }

    /*
     * Search the whole file: the partially full list first, then
     * the full one.
     */
    pub fn locate(&mut self, key: &T) -> Result<Option<Address>, HeapFileError> {
        if let Some(address) = self.find_record(self.first_partially_full, key)? {
            return Ok(Some(address));
        }
        self.find_record(self.first_full, key)
    }

    pub fn get_record(&mut self, key: &T) -> Result<Option<T>, HeapFileError> {
        let address = some_or_return!(self.locate(key)?);
        let block = some_or_return!(self.read_block(address)?);
        Ok(block.records.into_iter().find(|r| r.equals_by_id(key)))
    }

    /*
     * Delete the record with the key's id from the block at address.
     * A full block gets room again and moves back to the partially
     * full list. Empty blocks at the tail of the file are reclaimed.
     */
    pub fn delete_record(&mut self, address: Address, key: &T) -> Result<Option<Address>, HeapFileError> {
        let mut block = some_or_return!(
            self.read_block(address)?,
            "Cannot delete from unreadable block {}",
            address
        );
        let position = some_or_return!(
            block.position_of(key),
            "Record {} is not in block {}",
            key.id(),
            address
        );

        let before = block.list_kind();
        block.records.remove(position);
        debug!("Deleted record {} from block {}", key.id(), address);
        self.commit(block, before)?;
        self.shrink_file(|_| false)?;
        Ok(Some(address))
    }

    /*
     * Cache first read of a block. Any failure to read it from disk
     * is reported as None.
     */
    pub fn read_block(&mut self, address: Address) -> Result<Option<Block<T>>, HeapFileError> {
        if address.is_null() {
            return Ok(None);
        }
        if let Some(block) = self.cache.get(address) {
            debug!("Getting block {} from cache", address);
            return Ok(Some(block.clone()));
        }
        let block = some_or_return!(self.file.read::<T>(address)?);
        if block.address != address {
            warn!("Block at {} claims address {}", address, block.address);
            return Ok(None);
        }
        self.cache.put(block.clone());
        Ok(Some(block))
    }

    /*
     * Write through: disk first, then the cache.
     * A cached copy is dropped if the disk write fails, so the cache
     * never claims something the file may not hold.
     */
    pub fn write_block(&mut self, block: &Block<T>) -> Result<(), HeapFileError> {
        if let Err(e) = self.file.write(block) {
            self.cache.invalidate(block.address);
            return Err(e);
        }
        self.cache.put(block.clone());
        Ok(())
    }

    /*
     * Persist a block whose records changed and move it to the list
     * matching its new occupancy. before is the list it was in when
     * it was loaded.
     *
     * List pointers are taken from the current version of the block,
     * they may have moved since the caller loaded it.
     */
    pub(crate) fn commit(&mut self, mut block: Block<T>, before: ListKind) -> Result<(), HeapFileError> {
        let address = block.address;
        if let Some(current) = self.read_block(address)? {
            block.previous = current.previous;
            block.next = current.next;
        }
        self.write_block(&block)?;

        let after = block.list_kind();
        if before != after {
            self.unlink(address, before)?;
            self.link(address, after)?;
            debug!("Moved block {} from {:?} to {:?} list", address, before, after);
        }
        Ok(())
    }

    /*
     * Append an empty block at the end of the file and put it at
     * the head of the partially full list.
     */
    pub(crate) fn allocate_block(&mut self, local_depth: u32) -> Result<Block<T>, HeapFileError> {
        let offset = self.seek();
        let address = Address::from_offset(offset).ok_or(HeapFileError::AddressOverflow(offset))?;
        let block = Block::new(self.file.kind(), address, self.config.factor, local_depth);
        self.write_block(&block)?;
        self.link(address, ListKind::PartiallyFull)?;
        debug!("Allocated block {} at the end of file", address);
        self.load(address)
    }

    /*
     * Reclaim empty blocks at the tail of the file, one block at a
     * time, until the tail block holds records or keep() asks to
     * leave it alone. Returns the number of blocks reclaimed.
     */
    pub(crate) fn shrink_file<F>(&mut self, keep: F) -> Result<usize, HeapFileError>
    where
        F: Fn(Address) -> bool,
    {
        let mut removed = 0;
        while self.block_count() > 0 {
            let offset = self.seek() - self.block_size() as u64;
            let address = Address::from_offset(offset).ok_or(HeapFileError::AddressOverflow(offset))?;
            let block = self.load(address)?;
            if !block.is_empty() || keep(address) {
                break;
            }

            self.unlink(address, block.list_kind())?;
            self.file.truncate(offset)?;
            self.cache.invalidate_from(offset);
            info!("Reclaimed empty tail block {}, file length is now {}", address, offset);
            removed += 1;
        }
        Ok(removed)
    }

    /*
     * Every block of the file, in file order.
     */
    pub fn scan(&mut self) -> Result<Vec<Block<T>>, HeapFileError> {
        let block_size = self.block_size() as u64;
        let mut blocks = Vec::with_capacity(self.block_count());
        for n in 0..self.block_count() as u64 {
            let offset = n * block_size;
            let address = Address::from_offset(offset).ok_or(HeapFileError::AddressOverflow(offset))?;
            blocks.push(self.load(address)?);
        }
        Ok(blocks)
    }

    /*
     * Addresses along a list, starting at head.
     */
    pub fn chain(&mut self, head: Address) -> Result<Vec<Address>, HeapFileError> {
        let mut addresses = Vec::new();
        let mut address = head;
        while !address.is_null() {
            if addresses.len() > self.block_count() {
                warn!("Cycle detected in list starting at {}", head);
                break;
            }
            addresses.push(address);
            address = self.load(address)?.next;
        }
        Ok(addresses)
    }

    //a read that must succeed, the address came from our own lists.
    fn load(&mut self, address: Address) -> Result<Block<T>, HeapFileError> {
        self.read_block(address)?
            .ok_or(HeapFileError::BrokenLink { address })
    }

    fn head(&self, kind: ListKind) -> Address {
        match kind {
            ListKind::PartiallyFull => self.first_partially_full,
            ListKind::Full => self.first_full,
        }
    }

    fn set_head(&mut self, kind: ListKind, address: Address) {
        match kind {
            ListKind::PartiallyFull => self.first_partially_full = address,
            ListKind::Full => self.first_full = address,
        }
    }

    fn count_mut(&mut self, kind: ListKind) -> &mut usize {
        match kind {
            ListKind::PartiallyFull => &mut self.partially_full_count,
            ListKind::Full => &mut self.full_count,
        }
    }

    /*
     * Put a block at the head of a list.
     */
    fn link(&mut self, address: Address, kind: ListKind) -> Result<(), HeapFileError> {
        let head = self.head(kind);
        let mut block = self.load(address)?;
        block.previous = Address::NULL;
        block.next = head;
        self.write_block(&block)?;

        if !head.is_null() {
            let mut old_head = self.load(head)?;
            old_head.previous = address;
            self.write_block(&old_head)?;
        }
        self.set_head(kind, address);
        *self.count_mut(kind) += 1;
        Ok(())
    }

    /*
     * Take a block out of a list, patching both neighbours and the
     * head of the list when the block was the head.
     */
    fn unlink(&mut self, address: Address, kind: ListKind) -> Result<(), HeapFileError> {
        let mut block = self.load(address)?;

        if block.previous.is_null() {
            if self.head(kind) == address {
                self.set_head(kind, block.next);
            } else {
                warn!(
                    "Block {} has no predecessor but {} heads the {:?} list",
                    address,
                    self.head(kind),
                    kind
                );
            }
        } else {
            let mut previous = self.load(block.previous)?;
            previous.next = block.next;
            self.write_block(&previous)?;
        }

        if !block.next.is_null() {
            let mut next = self.load(block.next)?;
            next.previous = block.previous;
            self.write_block(&next)?;
        }

        block.previous = Address::NULL;
        block.next = Address::NULL;
        self.write_block(&block)?;

        let count = self.count_mut(kind);
        *count = count.saturating_sub(1);
        Ok(())
    }

    /*
     * Recover the list heads and counts of an existing file.
     *
     * The links found on disk are trusted when they form two proper
     * lists covering every block, otherwise both lists are threaded
     * again in file order.
     */
    fn rebuild_lists(&mut self) -> Result<(), HeapFileError> {
        let len = self.file.len().unwrap_or(0);
        let block_size = self.block_size() as u64;
        if len % block_size != 0 {
            warn!(
                "{} has {} trailing bytes that don't make up a block",
                self.path().display(),
                len % block_size
            );
        }

        let mut blocks = Vec::new();
        let mut consistent = true;
        for n in 0..(len / block_size) {
            let offset = n * block_size;
            let address = Address::from_offset(offset).ok_or(HeapFileError::AddressOverflow(offset))?;
            let mut block = self
                .file
                .read::<T>(address)?
                .ok_or(HeapFileError::BrokenLink { address })?;
            if block.address != address {
                warn!("Block at {} claims address {}", address, block.address);
                block.address = address;
                consistent = false;
            }
            blocks.push(block);
        }

        if consistent && self.adopt_links(&blocks) {
            return Ok(());
        }

        info!("Threading free space lists of {} again", self.path().display());
        self.first_partially_full = Address::NULL;
        self.first_full = Address::NULL;
        self.partially_full_count = 0;
        self.full_count = 0;
        self.cache.clear();
        //in reverse, so each list ends up in ascending address order.
        for mut block in blocks.into_iter().rev() {
            block.previous = Address::NULL;
            block.next = Address::NULL;
            let kind = block.list_kind();
            self.write_block(&block)?;
            self.link(block.address, kind)?;
        }
        Ok(())
    }

    fn adopt_links(&mut self, blocks: &[Block<T>]) -> bool {
        let by_address: HashMap<Address, &Block<T>> = blocks.iter().map(|b| (b.address, b)).collect();

        let mut heads = [Address::NULL; 2];
        let mut counts = [0usize; 2];
        for (i, kind) in [ListKind::PartiallyFull, ListKind::Full].iter().enumerate() {
            let members: Vec<&Block<T>> = blocks.iter().filter(|b| b.list_kind() == *kind).collect();
            let starts: Vec<&&Block<T>> = members.iter().filter(|b| b.previous.is_null()).collect();
            if members.is_empty() {
                continue;
            }
            if starts.len() != 1 {
                return false;
            }

            let head = starts[0].address;
            let mut previous = Address::NULL;
            let mut address = head;
            let mut length = 0;
            while !address.is_null() {
                let block = match by_address.get(&address) {
                    Some(v) => v,
                    None => return false,
                };
                if block.list_kind() != *kind || block.previous != previous || length >= members.len() {
                    return false;
                }
                previous = address;
                address = block.next;
                length += 1;
            }
            if length != members.len() {
                return false;
            }
            heads[i] = head;
            counts[i] = length;
        }

        self.first_partially_full = heads[0];
        self.first_full = heads[1];
        self.partially_full_count = counts[0];
        self.full_count = counts[1];
        true
    }
}
