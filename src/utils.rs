/**********************************************
  > File Name		: utils.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Thu 11 Mar 2021 03:54:41 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Utils functions for global usage.
 *
 * All on-disk integers are little endian. Callers check buffer
 * lengths before reaching for these, so an out of range offset
 * is a bug and panics like any other slice index.
 */

pub fn read_i32(data: &[u8], offset: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    i32::from_le_bytes(bytes)
}

pub fn write_i32(data: &mut [u8], offset: usize, value: i32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn read_f64(data: &[u8], offset: usize) -> f64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    f64::from_le_bytes(bytes)
}

pub fn write_f64(data: &mut [u8], offset: usize, value: f64) {
    data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

//keep at most max bytes of an ascii string, non ascii chars become '?'.
pub fn ascii_truncate(s: &str, max: usize) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .take(max)
        .collect()
}

/*
 * Length prefixed string field: 1 byte length followed by
 * max bytes of storage, unused bytes are zero.
 * Returns the number of bytes the field occupies.
 */
pub fn write_str_field(data: &mut [u8], offset: usize, s: &str, max: usize) -> usize {
    let bytes = s.as_bytes();
    let len = bytes.len().min(max);
    data[offset] = len as u8;
    data[offset + 1..offset + 1 + len].copy_from_slice(&bytes[..len]);
    1 + max
}

pub fn read_str_field(data: &[u8], offset: usize, max: usize) -> String {
    let len = (data[offset] as usize).min(max);
    String::from_utf8_lossy(&data[offset + 1..offset + 1 + len]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_fields_are_little_endian() {
        let mut buf = vec![0u8; 8];
        write_i32(&mut buf, 4, -2);
        assert_eq!(&buf[4..], &[0xfe, 0xff, 0xff, 0xff]);
        assert_eq!(read_i32(&buf, 4), -2);
    }

    #[test]
    fn str_field_truncates_to_max() {
        let mut buf = vec![0u8; 8];
        let used = write_str_field(&mut buf, 0, "abcdefghij", 5);
        assert_eq!(used, 6);
        assert_eq!(buf[0], 5);
        assert_eq!(read_str_field(&buf, 0, 5), "abcde");
        assert_eq!(buf[6], 0);
    }

    #[test]
    fn ascii_truncate_replaces_non_ascii() {
        assert_eq!(ascii_truncate("žltý", 3), "?lt");
    }
}
