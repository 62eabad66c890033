/**********************************************
  > File Name		: mod.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 29 Mar 2021 10:46:17 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * The indexing component provides keyed access to records stored
 * in block files.
 *
 * Extendible hashing is the data structure selected: an in-memory
 * directory maps the low bits of a record's hash to the bucket
 * (a block of the underlying heap file) holding the record, so
 * finding a record costs one block read however large the file
 * grows.
 */

pub mod directory;
pub mod hash_file;

pub use directory::Directory;
pub use hash_file::ExtendibleHashFile;

#[cfg(test)]
mod tests;
