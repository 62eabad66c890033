/**********************************************
  > File Name		: mod.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Sun 16 May 2021 03:02:37 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Concrete record types stored by the demo and the tests.
 * Strings are ascii, length prefixed and padded to their max length.
 */

pub mod customer;
pub mod service;

pub use customer::Customer;
pub use service::Service;
