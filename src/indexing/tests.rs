/**********************************************
  > File Name		: indexing/tests.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Wed 07 Apr 2021 09:15:42 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

use std::collections::HashMap;
use std::path::PathBuf;

use tempfile::TempDir;

use super::directory::{mask, Directory};
use super::hash_file::ExtendibleHashFile;
use crate::block_management::Address;
use crate::config::FileConfig;
use crate::record_management::Record;
use crate::records::{Customer, Service};
use crate::test_utils::{file_len, scratch_file, Item};

//factor 2 with 8 byte items gives 40 byte buckets.
const BUCKET: i32 = 40;

fn hash_file(factor: usize, max_directory_size: usize) -> (TempDir, PathBuf, ExtendibleHashFile<Item>) {
    let (dir, path) = scratch_file("hash.bin");
    let config = FileConfig::new(factor)
        .with_cache_limit(8)
        .with_max_directory_size(max_directory_size);
    let file = ExtendibleHashFile::create(&path, config).unwrap();
    (dir, path, file)
}

fn insert_all(file: &mut ExtendibleHashFile<Item>, ids: &[i32]) {
    for id in ids {
        assert!(file.insert_record(Item::new(*id)).unwrap().is_some(), "insert {}", id);
    }
}

/*
 * Check the directory against the buckets in the file and return the
 * number of records stored.
 */
fn check_directory(file: &mut ExtendibleHashFile<Item>) -> usize {
    let directory = file.directory().clone();
    assert_eq!(directory.len(), 1 << directory.global_depth());

    let blocks = file.scan().unwrap();
    let depths: HashMap<Address, u32> = blocks.iter().map(|b| (b.address, b.local_depth)).collect();

    let mut references: HashMap<Address, Vec<usize>> = HashMap::new();
    for (i, address) in directory.slots().iter().enumerate() {
        if !address.is_null() {
            references.entry(*address).or_default().push(i);
        }
    }
    for (address, slots) in references.iter() {
        let depth = *depths.get(address).expect("directory points outside the file");
        assert!(depth >= 1 && depth <= directory.global_depth());
        let m = mask(depth);
        for i in slots.iter() {
            assert_eq!(i & m, slots[0] & m, "slots {} and {} of bucket {}", i, slots[0], address);
        }
        assert_eq!(slots.len(), 1 << (directory.global_depth() - depth));
    }

    let mut records = 0;
    for block in blocks.iter() {
        assert!(block.valid_count() <= block.factor);
        for record in block.records.iter() {
            assert_eq!(directory.lookup(record.hash_code()), block.address);
        }
        records += block.valid_count();
    }
    records
}

#[test]
fn directory_starts_with_two_empty_slots() {
    let directory = Directory::new(8);
    assert_eq!(directory.global_depth(), 1);
    assert_eq!(directory.slots(), &[Address::NULL, Address::NULL]);
    assert_eq!(directory.index_of(5), 1);
    assert_eq!(directory.index_of(4), 0);
}

#[test]
fn directory_doubles_up_to_its_limit() {
    let mut directory = Directory::new(4);
    directory.bind(1, Address::new(40));
    assert!(directory.double());
    assert_eq!(directory.global_depth(), 2);
    assert_eq!(directory.get(3), Address::new(40));
    assert_eq!(directory.get(2), Address::NULL);

    assert!(!directory.can_split(2));
    assert!(directory.can_split(1));
    assert!(!directory.double());
    assert_eq!(directory.len(), 4);
}

#[test]
fn rebind_and_unbind() {
    let mut directory = Directory::new(16);
    directory.grow_to(3);
    directory.rebind(0, 1, Address::new(0));
    directory.rebind(5, 2, Address::new(40));
    assert_eq!(directory.slots()[1], Address::new(40));
    assert_eq!(directory.slots()[5], Address::new(40));
    assert_eq!(directory.slots()[3], Address::NULL);
    assert_eq!(directory.slots().iter().filter(|a| **a == Address::new(0)).count(), 4);

    assert_eq!(directory.unbind(Address::new(40)), 2);
    assert!(!directory.references(Address::new(40)));
    assert!(directory.references(Address::new(0)));
}

#[test]
fn first_inserts_share_a_bucket() {
    let (_dir, path, mut file) = hash_file(2, 1024);
    assert_eq!(file.insert_record(Item::new(0)).unwrap(), Some(Address::new(0)));
    assert_eq!(file.insert_record(Item::new(2)).unwrap(), Some(Address::new(0)));
    assert_eq!(file.directory().slots(), &[Address::new(0), Address::NULL]);
    assert_eq!(file_len(&path), BUCKET as u64);

    let bucket = file.read_block(Address::new(0)).unwrap().unwrap();
    assert_eq!(bucket.local_depth, 1);
    assert_eq!(bucket.valid_count(), 2);
    assert_eq!(file.heap().full_count(), 1);
}

#[test]
fn overflow_splits_and_doubles() {
    let (_dir, path, mut file) = hash_file(2, 1024);
    insert_all(&mut file, &[0, 2]);
    let address = file.insert_record(Item::new(4)).unwrap().unwrap();

    assert_eq!(file.global_depth(), 2);
    assert_eq!(file.directory().len(), 4);
    assert_eq!(file_len(&path), 2 * BUCKET as u64);

    let zero = file.find_record(&Item::new(0)).unwrap().unwrap();
    let two = file.find_record(&Item::new(2)).unwrap().unwrap();
    let four = file.find_record(&Item::new(4)).unwrap().unwrap();
    assert_eq!(four, address);
    assert_eq!(two, Address::new(0));
    assert_ne!(four, two);
    //0 and 4 agree on the two low bits, they stay together.
    assert_eq!(zero, four);
    assert_eq!(check_directory(&mut file), 3);
}

#[test]
fn empty_slot_gets_bucket_of_global_depth() {
    let (_dir, _path, mut file) = hash_file(2, 1024);
    insert_all(&mut file, &[0, 2, 4]);
    assert_eq!(file.global_depth(), 2);

    insert_all(&mut file, &[1, 3]);
    let one = file.directory().get(1);
    let three = file.directory().get(3);
    assert_eq!(one, Address::new(2 * BUCKET));
    assert_eq!(three, Address::new(3 * BUCKET));
    assert_eq!(file.read_block(one).unwrap().unwrap().local_depth, 2);

    //bucket of 2 has room left, 6 goes in without a split.
    insert_all(&mut file, &[6]);
    assert_eq!(file.global_depth(), 2);
    assert_eq!(file.heap().block_count(), 4);
    assert_eq!(check_directory(&mut file), 6);
}

#[test]
fn shared_bucket_splits_without_doubling() {
    let (_dir, _path, mut file) = hash_file(2, 1024);
    //depth 1 bucket behind slot 1, then grow the directory through slot 0.
    insert_all(&mut file, &[1, 0, 2, 4]);
    assert_eq!(file.global_depth(), 2);
    let odd = file.directory().get(1);
    assert_eq!(file.directory().get(3), odd);
    assert_eq!(file.read_block(odd).unwrap().unwrap().local_depth, 1);

    insert_all(&mut file, &[3, 5]);
    assert_eq!(file.global_depth(), 2);
    assert_ne!(file.directory().get(1), file.directory().get(3));
    assert_eq!(check_directory(&mut file), 6);
}

#[test]
fn repeated_split_when_all_records_collide() {
    let (_dir, _path, mut file) = hash_file(2, 1024);
    insert_all(&mut file, &[0, 4, 8]);

    assert_eq!(file.global_depth(), 3);
    let zero = file.find_record(&Item::new(0)).unwrap().unwrap();
    let four = file.find_record(&Item::new(4)).unwrap().unwrap();
    let eight = file.find_record(&Item::new(8)).unwrap().unwrap();
    assert_eq!(zero, eight);
    assert_ne!(zero, four);
    assert_eq!(file.heap().block_count(), 3);
    assert_eq!(check_directory(&mut file), 3);
}

#[test]
fn directory_limit_refuses_insert() {
    let (_dir, _path, mut file) = hash_file(1, 2);
    insert_all(&mut file, &[0]);
    assert_eq!(file.insert_record(Item::new(2)).unwrap(), None);
    assert_eq!(file.global_depth(), 1);
    assert_eq!(file.find_record(&Item::new(2)).unwrap(), None);
    assert_eq!(file.find_record(&Item::new(0)).unwrap(), Some(Address::new(0)));

    //the other slot is still usable.
    insert_all(&mut file, &[1]);
    assert_eq!(check_directory(&mut file), 2);
}

#[test]
fn directory_limit_after_partial_split() {
    let (_dir, _path, mut file) = hash_file(1, 4);
    insert_all(&mut file, &[0]);
    assert_eq!(file.insert_record(Item::new(4)).unwrap(), None);

    assert_eq!(file.global_depth(), 2);
    assert!(file.find_record(&Item::new(0)).unwrap().is_some());
    assert!(file.find_record(&Item::new(4)).unwrap().is_none());
    assert_eq!(check_directory(&mut file), 1);
}

#[test]
fn find_is_idempotent() {
    let (_dir, _path, mut file) = hash_file(2, 1024);
    insert_all(&mut file, &[0, 1, 2, 3, 4, 5]);
    let depth = file.global_depth();
    let slots = file.directory().slots().to_vec();

    let first = file.find_record(&Item::new(5)).unwrap();
    let second = file.find_record(&Item::new(5)).unwrap();
    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(file.global_depth(), depth);
    assert_eq!(file.directory().slots(), &slots[..]);
}

#[test]
fn lookups_of_absent_records() {
    let (_dir, _path, mut file) = hash_file(2, 1024);
    assert_eq!(file.find_record(&Item::new(1)).unwrap(), None);
    assert_eq!(file.delete_record(&Item::new(1)).unwrap(), None);

    insert_all(&mut file, &[1]);
    //same bucket, different id.
    assert_eq!(file.find_record(&Item::new(3)).unwrap(), None);
    assert_eq!(file.delete_record(&Item::new(3)).unwrap(), None);
    assert!(file.get_record(&Item::new(3)).unwrap().is_none());
    assert_eq!(file.get_record(&Item::new(1)).unwrap(), Some(Item::new(1)));
}

#[test]
fn deleting_only_record_of_tail_bucket_shrinks_file() {
    let (_dir, path, mut file) = hash_file(2, 1024);
    insert_all(&mut file, &[0, 1]);
    assert_eq!(file.directory().get(1), Address::new(BUCKET));
    assert_eq!(file_len(&path), 2 * BUCKET as u64);

    assert_eq!(file.delete_record(&Item::new(1)).unwrap(), Some(Address::new(BUCKET)));
    assert!(file.directory().get(1).is_null());
    assert_eq!(file_len(&path), BUCKET as u64);
    assert_eq!(file.find_record(&Item::new(1)).unwrap(), None);
    assert_eq!(check_directory(&mut file), 1);

    //the slot gets a fresh bucket again.
    insert_all(&mut file, &[3]);
    assert_eq!(file.directory().get(1), Address::new(BUCKET));
}

#[test]
fn emptied_inner_bucket_leaves_a_hole() {
    let (_dir, path, mut file) = hash_file(2, 1024);
    insert_all(&mut file, &[0, 1]);
    file.delete_record(&Item::new(0)).unwrap().unwrap();

    assert!(file.directory().get(0).is_null());
    assert_eq!(file_len(&path), 2 * BUCKET as u64);

    insert_all(&mut file, &[2]);
    assert_eq!(file.directory().get(0), Address::new(2 * BUCKET));
    assert_eq!(check_directory(&mut file), 2);
}

#[test]
fn bound_empty_bucket_is_not_reclaimed() {
    let (_dir, path, mut file) = hash_file(2, 1024);
    //0 and 8 end in the tail bucket, 4 in the middle one, bucket 0 is empty.
    insert_all(&mut file, &[0, 4, 8]);
    let empty = file.read_block(Address::new(0)).unwrap().unwrap();
    assert!(empty.is_empty());
    assert!(file.directory().references(Address::new(0)));

    file.delete_record(&Item::new(0)).unwrap().unwrap();
    file.delete_record(&Item::new(8)).unwrap().unwrap();
    assert_eq!(file_len(&path), 2 * BUCKET as u64);

    file.delete_record(&Item::new(4)).unwrap().unwrap();
    //bucket 0 is still bound to slots 2 and 6 and survives the sweep.
    assert_eq!(file_len(&path), BUCKET as u64);
    assert_eq!(check_directory(&mut file), 0);
}

#[test]
fn many_records_stay_reachable() {
    let (_dir, _path, mut file) = hash_file(3, 1024);
    let ids: Vec<i32> = (0..300).map(|i| (i * 37) % 1021).collect();
    insert_all(&mut file, &ids);
    assert_eq!(check_directory(&mut file), ids.len());
    for id in ids.iter() {
        assert!(file.find_record(&Item::new(*id)).unwrap().is_some(), "find {}", id);
    }

    let mut live = ids.len();
    for id in ids.iter().step_by(2) {
        assert!(file.delete_record(&Item::new(*id)).unwrap().is_some());
        live -= 1;
    }
    assert_eq!(check_directory(&mut file), live);
    for (i, id) in ids.iter().enumerate() {
        let found = file.find_record(&Item::new(*id)).unwrap();
        assert_eq!(found.is_some(), i % 2 == 1);
    }
}

#[test]
fn reopened_file_rebuilds_directory() {
    let (_dir, path, mut file) = hash_file(2, 1024);
    let ids: Vec<i32> = (0..40).map(|i| i * 3).collect();
    insert_all(&mut file, &ids);
    let depth = file.global_depth();
    drop(file);

    let config = FileConfig::new(2).with_max_directory_size(1024);
    let mut file: ExtendibleHashFile<Item> = ExtendibleHashFile::open(&path, config).unwrap();
    assert!(file.global_depth() <= depth);
    assert_eq!(check_directory(&mut file), ids.len());
    for id in ids.iter() {
        assert!(file.find_record(&Item::new(*id)).unwrap().is_some());
    }

    insert_all(&mut file, &[1000, 1001]);
    assert_eq!(check_directory(&mut file), ids.len() + 2);
}

#[test]
fn stores_customers() {
    let (_dir, path) = scratch_file("customers.bin");
    let mut file: ExtendibleHashFile<Customer> = ExtendibleHashFile::create(&path, FileConfig::new(3)).unwrap();
    for id in 0..20 {
        let mut customer = Customer::new(id, &format!("Name{}", id), &format!("Surname{}", id));
        for s in 0..(id % 5) {
            customer
                .add_service(Service::new(id * 10 + s, 20210517, 19.99, &format!("Desc{}", s)))
                .unwrap();
        }
        assert!(file.insert_record(customer).unwrap().is_some());
    }

    let customer = file.get_record(&Customer::key(13)).unwrap().unwrap();
    assert_eq!(customer.name, "Name13");
    assert_eq!(customer.services().len(), 3);
    assert_eq!(customer.services()[2].description, "Desc2");

    assert!(file.delete_record(&Customer::key(13)).unwrap().is_some());
    assert!(file.find_record(&Customer::key(13)).unwrap().is_none());
}
