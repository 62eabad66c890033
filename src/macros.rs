/**********************************************
  > File Name		: macros.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Fri 14 May 2021 10:34:16 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Unwrap an Option inside a function returning Result<Option<_>, _>,
 * bailing out with Ok(None) (the not found result) when it's empty.
 * An optional format string is logged at debug level before returning.
 */
#[macro_export]
macro_rules! some_or_return {
    ($opt: expr) => {{
        match $opt {
            Some(v) => v,
            None => {
                return Ok(None);
            }
        }
    }};
    ($opt: expr, $($arg: tt)+) => {{
        match $opt {
            Some(v) => v,
            None => {
                log::debug!($($arg)+);
                return Ok(None);
            }
        }
    }};
}

/*
 * Same as some_or_return, but for the NULL address sentinel.
 */
#[macro_export]
macro_rules! address_or_return {
    ($addr: expr, $($arg: tt)+) => {{
        let addr = $addr;
        if addr.is_null() {
            log::debug!($($arg)+);
            return Ok(None);
        }
        addr
    }};
}
