/**********************************************
  > File Name		: hash_file.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue Apr  6 10:24:27 2021
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Extendible hashing on top of a heap file.
 *
 * Buckets are ordinary blocks of the underlying heap file, carrying
 * their factor and local depth in the header. They're allocated at
 * the end of the file and stay members of the heap file's free space
 * lists, so seek() keeps working for them.
 *
 * A record is routed by the low global_depth bits of its hash to a
 * directory slot, and from there to its bucket. Lookups touch a
 * single bucket, there's no chain to walk.
 *
 * When an insert overflows a bucket, the bucket is split:
 *   1. its local depth grows by one, doubling the directory when the
 *      local depth passes the global depth,
 *   2. a sibling bucket with the same local depth is allocated,
 *   3. the slots agreeing with the inserted record's slot on the low
 *      local depth bits are pointed at the sibling,
 *   4. the records are redistributed by where their slot points now.
 * If all records land on the same side the split is repeated. If the
 * directory may not double anymore the insert is refused and the
 * bucket keeps the records it had.
 *
 * Buckets are never merged. An emptied bucket drops out of the
 * directory and is reclaimed when it's the last block of the file.
 */

use std::path::Path;

use log::{debug, info, warn};

use super::directory::Directory;
use crate::block_management::{Address, Block, BlockKind, ListKind};
use crate::config::FileConfig;
use crate::errors::IndexingError;
use crate::record_management::{HeapFile, Record};

#[derive(Debug)]
pub struct ExtendibleHashFile<T: Record> {
    heap: HeapFile<T>,
    directory: Directory,
}

impl<T: Record> ExtendibleHashFile<T> {
    pub fn create<P: AsRef<Path>>(path: P, config: FileConfig) -> Result<Self, IndexingError> {
        let heap = HeapFile::create_with_kind(path.as_ref(), config, BlockKind::Hash)?;
        Ok(Self {
            heap,
            directory: Directory::new(config.max_directory_size),
        })
    }

    /*
     * Open an existing hash file. The directory was never stored, it
     * is rebuilt from the buckets found in the file.
     */
    pub fn open<P: AsRef<Path>>(path: P, config: FileConfig) -> Result<Self, IndexingError> {
        let heap = HeapFile::open_with_kind(path.as_ref(), config, BlockKind::Hash)?;
        let mut file = Self {
            heap,
            directory: Directory::new(config.max_directory_size),
        };
        file.rebuild_directory()?;
        Ok(file)
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn global_depth(&self) -> u32 {
        self.directory.global_depth()
    }

    pub fn heap(&self) -> &HeapFile<T> {
        &self.heap
    }

    pub fn scan(&mut self) -> Result<Vec<Block<T>>, IndexingError> {
        Ok(self.heap.scan()?)
    }

    pub fn read_block(&mut self, address: Address) -> Result<Option<Block<T>>, IndexingError> {
        Ok(self.heap.read_block(address)?)
    }

    /*
     * Returns the address of the bucket the record ended up in, or
     * None if it couldn't be stored. After a split that's not always
     * the bucket it was first put in.
     */
    pub fn insert_record(&mut self, record: T) -> Result<Option<Address>, IndexingError> {
        let hash = record.hash_code();
        let index = self.directory.index_of(hash);
        let address = self.directory.get(index);

        let (mut block, mut before) = if address.is_null() {
            let block = self.heap.allocate_block(self.directory.global_depth())?;
            self.directory.bind(index, block.address);
            debug!("Bound new bucket {} to slot {}", block.address, index);
            (block, ListKind::PartiallyFull)
        } else {
            let block = some_or_return!(
                self.heap.read_block(address)?,
                "Bucket {} is unreadable",
                address
            );
            let kind = block.list_kind();
            (block, kind)
        };

        block.records.push(record);
        while block.is_overflowing() {
            if !self.directory.can_split(block.local_depth) {
                warn!(
                    "Warning: directory size would exceed maximum of {}, bucket {} cannot split",
                    self.directory.max_size(),
                    block.address
                );
                //the record just inserted is always the last one.
                block.records.pop();
                self.heap.commit(block, before)?;
                return Ok(None);
            }

            let sibling = self.split(&mut block, hash)?;
            if sibling.is_overflowing() {
                self.heap.commit(block, before)?;
                block = sibling;
                before = ListKind::PartiallyFull;
            } else {
                self.heap.commit(sibling, ListKind::PartiallyFull)?;
            }
        }

        self.heap.commit(block, before)?;
        Ok(Some(self.directory.lookup(hash)))
    }

    pub fn find_record(&mut self, key: &T) -> Result<Option<Address>, IndexingError> {
        let address = address_or_return!(
            self.directory.lookup(key.hash_code()),
            "No bucket for record {}",
            key.id()
        );
        let block = some_or_return!(self.heap.read_block(address)?);
        Ok(block.position_of(key).map(|_| address))
    }

    pub fn get_record(&mut self, key: &T) -> Result<Option<T>, IndexingError> {
        let address = address_or_return!(
            self.directory.lookup(key.hash_code()),
            "No bucket for record {}",
            key.id()
        );
        let block = some_or_return!(self.heap.read_block(address)?);
        Ok(block.records.into_iter().find(|r| r.equals_by_id(key)))
    }

    pub fn delete_record(&mut self, key: &T) -> Result<Option<Address>, IndexingError> {
        let address = address_or_return!(
            self.directory.lookup(key.hash_code()),
            "No bucket for record {}",
            key.id()
        );
        let mut block = some_or_return!(
            self.heap.read_block(address)?,
            "Bucket {} is unreadable",
            address
        );
        let position = some_or_return!(
            block.position_of(key),
            "Record {} is not in bucket {}",
            key.id(),
            address
        );

        let before = block.list_kind();
        block.records.remove(position);
        let empty = block.is_empty();
        self.heap.commit(block, before)?;

        if empty {
            let cleared = self.directory.unbind(address);
            debug!("Bucket {} is empty, cleared {} directory slots", address, cleared);
            let directory = &self.directory;
            self.heap.shrink_file(|a| directory.references(a))?;
        }
        Ok(Some(address))
    }

    /*
     * Split an overflowing bucket, hash is the hash of the record
     * whose insert caused the overflow. Both halves are returned
     * unwritten: the bucket through the reference, the sibling as
     * the result.
     */
    fn split(&mut self, block: &mut Block<T>, hash: u32) -> Result<Block<T>, IndexingError> {
        block.local_depth += 1;
        if block.local_depth > self.directory.global_depth() && !self.directory.double() {
            block.local_depth -= 1;
            return Err(IndexingError::DepthOutOfRange {
                address: block.address,
                local_depth: block.local_depth + 1,
                max: self.directory.global_depth(),
            });
        }

        let mut sibling = self.heap.allocate_block(block.local_depth)?;
        let index = self.directory.index_of(hash);
        self.directory.rebind(index, block.local_depth, sibling.address);

        let records = std::mem::take(&mut block.records);
        for record in records {
            if self.directory.lookup(record.hash_code()) == block.address {
                block.records.push(record);
            } else {
                sibling.records.push(record);
            }
        }

        debug!(
            "Split bucket {} at depth {}: {} records stay, {} move to {}",
            block.address,
            block.local_depth,
            block.valid_count(),
            sibling.valid_count(),
            sibling.address
        );
        Ok(sibling)
    }

    /*
     * Every non empty bucket claims the slots agreeing with its
     * records' hashes on its local depth low bits. Empty buckets
     * can't tell which slots they served and stay unbound.
     */
    fn rebuild_directory(&mut self) -> Result<(), IndexingError> {
        let blocks = self.heap.scan()?;
        let mut directory = Directory::new(self.directory.max_size());

        let depth = blocks
            .iter()
            .filter(|b| !b.is_empty())
            .map(|b| b.local_depth)
            .max()
            .unwrap_or(1)
            .max(1);
        if !directory.grow_to(depth) {
            return Err(IndexingError::DepthOutOfRange {
                address: Address::NULL,
                local_depth: depth,
                max: directory.global_depth(),
            });
        }

        for block in blocks.iter().filter(|b| !b.is_empty()) {
            if block.local_depth == 0 || block.local_depth > directory.global_depth() {
                return Err(IndexingError::DepthOutOfRange {
                    address: block.address,
                    local_depth: block.local_depth,
                    max: directory.global_depth(),
                });
            }
            let index = directory.index_of(block.records[0].hash_code());
            directory.rebind(index, block.local_depth, block.address);
        }

        info!(
            "Rebuilt directory of {}: global depth {}, {} slots",
            self.heap.path().display(),
            directory.global_depth(),
            directory.len()
        );
        self.directory = directory;
        Ok(())
    }
}
