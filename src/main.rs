/**********************************************
  > File Name		: main.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue 02 Mar 2021 10:28:03 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Walks a spread of customers through a heap file and an extendible
 * hash file: insert everything, find everything, delete every other
 * customer, then dump what's left.
 *
 * usage: hashfile [path] [count]
 */

use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process;

use log::{error, info, warn};

use hashfile::records::{Customer, Service};
use hashfile::{ExtendibleHashFile, FileConfig, HeapFile, Record};

const DEFAULT_PATH: &str = "customers.bin";
const DEFAULT_COUNT: i32 = 64;

fn customer(id: i32) -> Result<Customer, Box<dyn Error>> {
    let mut customer = Customer::new(id, &format!("Name{}", id), &format!("Surname{}", id));
    for s in 0..(id % 4) {
        let service = Service::new(
            id * 10 + s,
            20210501 + s,
            10.0 + f64::from(id % 7) * 2.5,
            &format!("Service {} of {}", s, id),
        );
        customer.add_service(service)?;
    }
    Ok(customer)
}

//ids spread over a range wider than count so buckets fill unevenly.
fn spread(count: i32) -> Vec<i32> {
    (0..count).map(|i| (i * 37 + 11) % 1021).collect()
}

fn run_heap(path: PathBuf, ids: &[i32]) -> Result<(), Box<dyn Error>> {
    let mut file: HeapFile<Customer> = HeapFile::create(&path, FileConfig::new(4))?;
    let mut placed = Vec::with_capacity(ids.len());
    for id in ids {
        match file.insert_record(customer(*id)?)? {
            Some(address) => placed.push((*id, address)),
            None => warn!("Customer {} was not inserted", id),
        }
    }
    info!(
        "Heap file: {} partially full and {} full blocks",
        file.partially_full_count(),
        file.full_count()
    );

    for (id, address) in placed.iter().step_by(2) {
        if file.delete_record(*address, &Customer::key(*id))?.is_none() {
            warn!("Customer {} was not found in block {}", id, address);
        }
    }
    let mut missing = 0;
    for (id, _) in placed.iter().skip(1).step_by(2) {
        if file.locate(&Customer::key(*id))?.is_none() {
            missing += 1;
        }
    }
    if missing > 0 {
        error!("{} customers went missing from the heap file", missing);
    }
    info!(
        "Heap file after deletes: {} blocks, {} bytes",
        file.block_count(),
        file.seek()
    );
    Ok(())
}

fn run_hash(path: PathBuf, ids: &[i32]) -> Result<(), Box<dyn Error>> {
    let mut file: ExtendibleHashFile<Customer> = ExtendibleHashFile::create(&path, FileConfig::new(2))?;
    let mut inserted = 0;
    for id in ids {
        match file.insert_record(customer(*id)?)? {
            Some(address) => {
                info!("Inserted customer {} into bucket {}", id, address);
                inserted += 1;
            }
            None => warn!("Customer {} was not inserted", id),
        }
    }

    let mut found = 0;
    for id in ids {
        if file.find_record(&Customer::key(*id))?.is_some() {
            found += 1;
        }
    }
    info!("Found {} of {} inserted customers", found, inserted);
    if found != inserted {
        error!("Found {} customers, expected {}", found, inserted);
    }

    let mut deleted = 0;
    for id in ids.iter().step_by(2) {
        if file.delete_record(&Customer::key(*id))?.is_some() {
            deleted += 1;
        }
    }

    let blocks = file.scan()?;
    let live: usize = blocks.iter().map(|b| b.valid_count()).sum();
    info!(
        "Deleted {} customers, {} left in {} buckets",
        deleted,
        live,
        blocks.len()
    );
    if live != inserted - deleted {
        error!("{} customers left, expected {}", live, inserted - deleted);
    }

    if let Some(id) = ids.get(1) {
        if let Some(customer) = file.get_record(&Customer::key(*id))? {
            println!("{}", customer);
        }
    }
    println!("{}", file.directory());
    for block in blocks.iter() {
        println!("{}", block);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_PATH.to_string()));
    let count = match args.next() {
        Some(v) => v.parse::<i32>()?,
        None => DEFAULT_COUNT,
    };
    let ids = spread(count.max(0));
    info!(
        "Running with {} customers of {} bytes each",
        ids.len(),
        Customer::SIZE
    );

    let mut heap_path = path.clone().into_os_string();
    heap_path.push(".heap");
    run_heap(PathBuf::from(heap_path), &ids)?;
    run_hash(path, &ids)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        eprintln!("hashfile: {}", e);
        process::exit(1);
    }
}
