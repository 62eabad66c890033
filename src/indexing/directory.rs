/**********************************************
  > File Name		: directory.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue Apr  6 10:24:27 2021
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * The directory of an extendible hash file.
 *
 * Slot i holds the address of the bucket that records whose hash
 * ends with the global_depth low bits of i are routed to. A bucket
 * with local depth d is referenced by every slot that agrees with
 * it on the low d bits, that is 2^(global_depth - d) slots.
 *
 * The directory lives in memory only. It always has 2^global_depth
 * slots, starts as [NULL, NULL] and never grows past max_size.
 */

use std::fmt;

use log::info;

use crate::block_management::Address;

#[derive(Debug, Clone)]
pub struct Directory {
    slots: Vec<Address>,
    global_depth: u32,
    max_size: usize,
}

//the low depth bits of a hash.
pub fn mask(depth: u32) -> usize {
    if depth as usize >= usize::BITS as usize {
        usize::MAX
    } else {
        (1usize << depth) - 1
    }
}

impl Directory {
    pub fn new(max_size: usize) -> Self {
        Self {
            slots: vec![Address::NULL; 2],
            global_depth: 1,
            max_size,
        }
    }

    pub fn global_depth(&self) -> u32 {
        self.global_depth
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|a| a.is_null())
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn slots(&self) -> &[Address] {
        &self.slots
    }

    pub fn index_of(&self, hash: u32) -> usize {
        hash as usize & mask(self.global_depth)
    }

    pub fn get(&self, index: usize) -> Address {
        self.slots[index]
    }

    pub fn lookup(&self, hash: u32) -> Address {
        self.slots[self.index_of(hash)]
    }

    pub fn bind(&mut self, index: usize, address: Address) {
        self.slots[index] = address;
    }

    pub fn references(&self, address: Address) -> bool {
        self.slots.contains(&address)
    }

    /*
     * Whether a bucket of the given local depth can be split, i.e.
     * the split doesn't need the directory to double past max_size.
     */
    pub fn can_split(&self, local_depth: u32) -> bool {
        if local_depth < self.global_depth {
            return true;
        }
        self.global_depth < 31 && self.slots.len() * 2 <= self.max_size
    }

    /*
     * Duplicate every slot, slot i + len ends up pointing where slot
     * i does. Returns false without touching anything when the new
     * size would exceed max_size.
     */
    pub fn double(&mut self) -> bool {
        let len = self.slots.len();
        if len * 2 > self.max_size {
            return false;
        }
        self.slots.extend_from_within(..len);
        self.global_depth += 1;
        info!("Directory doubled. New global depth: {}", self.global_depth);
        true
    }

    /*
     * Point every slot agreeing with index on the low local_depth
     * bits at address.
     */
    pub fn rebind(&mut self, index: usize, local_depth: u32, address: Address) {
        let mask = mask(local_depth);
        let pattern = index & mask;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if i & mask == pattern {
                *slot = address;
            }
        }
    }

    //clear every slot pointing at address, returns how many there were.
    pub fn unbind(&mut self, address: Address) -> usize {
        let mut cleared = 0;
        for slot in self.slots.iter_mut() {
            if *slot == address {
                *slot = Address::NULL;
                cleared += 1;
            }
        }
        cleared
    }

    /*
     * Grow the directory to hold at least depth bits, used when
     * rebuilding it from the buckets of an existing file.
     */
    pub(crate) fn grow_to(&mut self, depth: u32) -> bool {
        while self.global_depth < depth {
            if !self.double() {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Global Depth: {}", self.global_depth)?;
        write!(f, "Directory:")?;
        for (i, address) in self.slots.iter().enumerate() {
            write!(f, "\nIndex {:02}: Block Address {}", i, address)?;
        }
        Ok(())
    }
}
