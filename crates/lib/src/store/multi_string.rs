//! Multi-string value stores.
//!
//! On Windows the collector reads its environment from a `REG_MULTI_SZ`
//! service value. [`FileMultiStringStore`] keeps the same data as one value
//! per line under a directory, for non-Windows hosts and for tests.

use std::io;
use std::path::PathBuf;

use super::file::{read_optional, remove_if_exists, write_atomic};

/// A store of named string-list values.
pub trait MultiStringStore {
  /// Short backend name for logs.
  fn name(&self) -> &'static str;

  /// Read a value. `None` when the value (or its key) does not exist.
  fn read(&self, key: &str, value: &str) -> io::Result<Option<Vec<String>>>;

  fn write(&self, key: &str, value: &str, values: &[String]) -> io::Result<()>;

  /// Remove a value, returning whether it existed.
  fn delete(&self, key: &str, value: &str) -> io::Result<bool>;
}

/// Emulates registry values as files: `<root>/<key path>/<value>`.
#[derive(Debug, Clone)]
pub struct FileMultiStringStore {
  root: PathBuf,
}

impl FileMultiStringStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Location of `value` under `key`. Backslash separated keys become nested
  /// directories.
  pub fn value_path(&self, key: &str, value: &str) -> PathBuf {
    let mut path = self.root.clone();
    for part in key.split(['\\', '/']).filter(|p| !p.is_empty()) {
      path.push(part);
    }
    path.join(value)
  }
}

impl MultiStringStore for FileMultiStringStore {
  fn name(&self) -> &'static str {
    "file"
  }

  fn read(&self, key: &str, value: &str) -> io::Result<Option<Vec<String>>> {
    let content = read_optional(&self.value_path(key, value))?;
    Ok(content.map(|c| c.lines().filter(|l| !l.is_empty()).map(str::to_string).collect()))
  }

  fn write(&self, key: &str, value: &str, values: &[String]) -> io::Result<()> {
    let mut content = String::new();
    for v in values {
      content.push_str(v);
      content.push('\n');
    }
    write_atomic(&self.value_path(key, value), &content)
  }

  fn delete(&self, key: &str, value: &str) -> io::Result<bool> {
    remove_if_exists(&self.value_path(key, value))
  }
}

/// `REG_MULTI_SZ` values under `HKEY_LOCAL_MACHINE`.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsRegistry;

#[cfg(windows)]
impl MultiStringStore for WindowsRegistry {
  fn name(&self) -> &'static str {
    "registry"
  }

  fn read(&self, key: &str, value: &str) -> io::Result<Option<Vec<String>>> {
    registry::read_multi_sz(key, value)
  }

  fn write(&self, key: &str, value: &str, values: &[String]) -> io::Result<()> {
    registry::write_multi_sz(key, value, values)
  }

  fn delete(&self, key: &str, value: &str) -> io::Result<bool> {
    registry::delete_value(key, value)
  }
}

#[cfg(windows)]
mod registry {
  use std::io;
  use std::ptr;

  use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, WIN32_ERROR};
  use windows_sys::Win32::System::Registry::{
    HKEY, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_SET_VALUE, REG_MULTI_SZ, REG_SAM_FLAGS, REG_VALUE_TYPE, RegCloseKey,
    RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW,
  };

  /// An open registry key, closed on drop.
  struct Key(HKEY);

  impl Drop for Key {
    fn drop(&mut self) {
      // SAFETY: the handle came from a successful RegOpenKeyExW and is closed once.
      unsafe {
        RegCloseKey(self.0);
      }
    }
  }

  fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
  }

  fn check(status: WIN32_ERROR) -> io::Result<()> {
    if status == ERROR_SUCCESS {
      Ok(())
    } else {
      Err(io::Error::from_raw_os_error(status as i32))
    }
  }

  fn open(key: &str, access: REG_SAM_FLAGS) -> io::Result<Option<Key>> {
    let subkey = wide(key);
    let mut handle: HKEY = ptr::null_mut();
    // SAFETY: subkey is NUL terminated and handle is a valid out pointer.
    let status = unsafe { RegOpenKeyExW(HKEY_LOCAL_MACHINE, subkey.as_ptr(), 0, access, &mut handle) };
    if status == ERROR_FILE_NOT_FOUND {
      return Ok(None);
    }
    check(status)?;
    Ok(Some(Key(handle)))
  }

  pub fn read_multi_sz(key: &str, value: &str) -> io::Result<Option<Vec<String>>> {
    let Some(handle) = open(key, KEY_QUERY_VALUE)? else {
      return Ok(None);
    };
    let name = wide(value);

    let mut kind: REG_VALUE_TYPE = 0;
    let mut size: u32 = 0;
    // SAFETY: a null data pointer asks only for the size and type.
    let status = unsafe {
      RegQueryValueExW(
        handle.0,
        name.as_ptr(),
        ptr::null(),
        &mut kind,
        ptr::null_mut(),
        &mut size,
      )
    };
    if status == ERROR_FILE_NOT_FOUND {
      return Ok(None);
    }
    check(status)?;
    if kind != REG_MULTI_SZ {
      return Err(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("registry value {} is not REG_MULTI_SZ", value),
      ));
    }

    let mut buf = vec![0u16; (size as usize).div_ceil(2)];
    // SAFETY: buf holds at least `size` bytes.
    let status = unsafe {
      RegQueryValueExW(
        handle.0,
        name.as_ptr(),
        ptr::null(),
        &mut kind,
        buf.as_mut_ptr().cast(),
        &mut size,
      )
    };
    check(status)?;
    buf.truncate(size as usize / 2);
    Ok(Some(decode_multi_sz(&buf)))
  }

  pub fn write_multi_sz(key: &str, value: &str, values: &[String]) -> io::Result<()> {
    let handle = open(key, KEY_SET_VALUE)?.ok_or_else(|| {
      io::Error::new(
        io::ErrorKind::NotFound,
        format!("registry key HKLM\\{} does not exist", key),
      )
    })?;
    let name = wide(value);
    let data = encode_multi_sz(values);
    let bytes = u32::try_from(data.len() * 2).map_err(io::Error::other)?;
    // SAFETY: data is a valid buffer of `bytes` bytes.
    let status = unsafe {
      RegSetValueExW(
        handle.0,
        name.as_ptr(),
        0,
        REG_MULTI_SZ,
        data.as_ptr().cast(),
        bytes,
      )
    };
    check(status)
  }

  pub fn delete_value(key: &str, value: &str) -> io::Result<bool> {
    let Some(handle) = open(key, KEY_SET_VALUE)? else {
      return Ok(false);
    };
    let name = wide(value);
    // SAFETY: name is NUL terminated and the key handle is open.
    let status = unsafe { RegDeleteValueW(handle.0, name.as_ptr()) };
    if status == ERROR_FILE_NOT_FOUND {
      return Ok(false);
    }
    check(status)?;
    Ok(true)
  }

  fn encode_multi_sz(values: &[String]) -> Vec<u16> {
    let mut data = Vec::new();
    for v in values {
      data.extend(v.encode_utf16());
      data.push(0);
    }
    if values.is_empty() {
      data.push(0);
    }
    data.push(0);
    data
  }

  fn decode_multi_sz(buf: &[u16]) -> Vec<String> {
    buf
      .split(|c| *c == 0)
      .take_while(|s| !s.is_empty())
      .map(String::from_utf16_lossy)
      .collect()
  }

}
