//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] with the on-flash layout the stock Arduino
//! `Preferences` library produces: floats as raw 4-byte little-endian
//! blobs, booleans as single `u8` entries.  A board flashed over an older
//! firmware keeps its calibrated thresholds.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: raw sys calls, one open/commit/close cycle per operation.
//! On host/test: a `RefCell<HashMap>` byte store with the same layout.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{StorageError, StoragePort};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub struct NvsStore {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsStore {
    /// Initialise NVS flash and construct the store.
    ///
    /// On first boot or after a partition-version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase run from the single
            // main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NvsStore: erasing and re-initialising flash partition");
                let ret2 = unsafe { nvs_flash_erase() };
                if ret2 != ESP_OK {
                    return Err(StorageError::IoError);
                }
                let ret3 = unsafe { nvs_flash_init() };
                if ret3 != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsStore: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    /// Construct without initialising the flash partition.  Used when
    /// [`new`](Self::new) fails at boot: on the device every subsequent
    /// operation errors out, which surfaces as save-failure
    /// acknowledgments instead of a crash.
    pub fn offline() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns_buf = Self::c_str(namespace);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// NVS namespaces and keys are limited to 15 chars plus terminator.
    #[cfg(target_os = "espidf")]
    fn c_str(s: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let bytes = s.as_bytes();
        let len = bytes.len().min(15);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }
}

#[cfg(target_os = "espidf")]
fn map_nvs_err(rc: i32) -> StorageError {
    if rc == ESP_ERR_NVS_NOT_FOUND {
        StorageError::NotFound
    } else if rc == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
        StorageError::Full
    } else {
        StorageError::IoError
    }
}

impl StoragePort for NvsStore {
    fn get_f32(&self, namespace: &str, key: &str) -> Result<f32, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(bytes) => {
                    let raw: [u8; 4] = bytes
                        .as_slice()
                        .try_into()
                        .map_err(|_| StorageError::IoError)?;
                    Ok(f32::from_le_bytes(raw))
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let key_buf = Self::c_str(key);
                let mut raw = [0u8; 4];
                let mut size = raw.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        raw.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                if size != raw.len() {
                    // Not a float-sized blob; treat as corrupt.
                    return Err(ESP_FAIL);
                }
                Ok(f32::from_le_bytes(raw))
            });
            result.map_err(map_nvs_err)
        }
    }

    fn put_f32(&mut self, namespace: &str, key: &str, value: f32) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store
                .borrow_mut()
                .insert(composite, value.to_le_bytes().to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let bytes = value.to_le_bytes();
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let key_buf = Self::c_str(key);
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        bytes.as_ptr() as *const _,
                        bytes.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(map_nvs_err)
        }
    }

    fn get_bool(&self, namespace: &str, key: &str) -> Result<bool, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(bytes) if bytes.len() == 1 => Ok(bytes[0] != 0),
                Some(_) => Err(StorageError::IoError),
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let key_buf = Self::c_str(key);
                let mut out: u8 = 0;
                let ret = unsafe { nvs_get_u8(handle, key_buf.as_ptr() as *const _, &mut out) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(out != 0)
            });
            result.map_err(map_nvs_err)
        }
    }

    fn put_bool(&mut self, namespace: &str, key: &str, value: bool) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, vec![u8::from(value)]);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let key_buf = Self::c_str(key);
                let ret =
                    unsafe { nvs_set_u8(handle, key_buf.as_ptr() as *const _, u8::from(value)) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(map_nvs_err)
        }
    }
}
