//
// registry.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 12 2021
//

//! Handle registry for environments created through the C binding.
//!
//! Handles are plain integers. Zero is never a valid handle and values are never reused, so a stale handle
//! is reported instead of touching freed memory. Environments are `!Send`, so the registry is per thread.

use crate::environment::NesInterface;
use crate::error::RegistryError;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub type Handle = usize;

/// Handle values are process wide
static NEXT_HANDLE: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    static REGISTRY: RefCell<HashMap<Handle, Rc<RefCell<NesInterface>>>> = RefCell::new(HashMap::new());
}

/// Take ownership of an environment and return its handle
pub fn insert(env: NesInterface) -> Handle {
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    REGISTRY.with(|registry| registry.borrow_mut().insert(handle, Rc::new(RefCell::new(env))));

    tracing::debug!(handle, "registered environment");

    handle
}

/// Destroy the environment behind a handle
pub fn remove(handle: Handle) -> Result<(), RegistryError> {
    let entry = REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();

        let busy = match registry.get(&handle) {
            Some(entry) => entry.try_borrow_mut().is_err(),
            None => return Err(RegistryError::UnknownHandle(handle)),
        };

        if busy {
            return Err(RegistryError::Busy(handle));
        }

        registry.remove(&handle).ok_or(RegistryError::UnknownHandle(handle))
    })?;

    // Dropped outside of the registry borrow
    drop(entry);
    tracing::debug!(handle, "destroyed environment");

    Ok(())
}

pub fn contains(handle: Handle) -> bool {
    REGISTRY.with(|registry| registry.borrow().contains_key(&handle))
}

/// Run `f` with exclusive access to the environment behind `handle`
pub fn with<R, F>(handle: Handle, f: F) -> Result<R, RegistryError>
where
    F: FnOnce(&mut NesInterface) -> R,
{
    let entry = REGISTRY
        .with(|registry| registry.borrow().get(&handle).cloned())
        .ok_or(RegistryError::UnknownHandle(handle))?;

    let mut env = entry.try_borrow_mut().map_err(|_| RegistryError::Busy(handle))?;

    Ok(f(&mut env))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvConfig;

    /// NROM image that spins at the reset vector
    fn spin_rom() -> Vec<u8> {
        let mut prg = vec![0xEA; 0x4000];
        prg[..3].copy_from_slice(&[0x4C, 0x00, 0x80]);
        prg[0x3FFA..].copy_from_slice(&[0x00, 0x80, 0x00, 0x80, 0x00, 0x80]);

        let mut rom = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        rom.extend_from_slice(&prg);
        rom.extend_from_slice(&[0u8; 0x2000]);

        rom
    }

    fn register() -> (tempfile::TempDir, Handle) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spin.nes");
        std::fs::write(&path, spin_rom()).unwrap();

        let env = NesInterface::with_config(&path, EnvConfig::default()).unwrap();
        (dir, insert(env))
    }

    #[test]
    fn nested_access_is_busy() {
        let (_dir, handle) = register();

        let inner = with(handle, |_| with(handle, |env| env.frame_number())).unwrap();
        assert_eq!(inner, Err(RegistryError::Busy(handle)));

        // The outer borrow is released afterwards
        assert_eq!(with(handle, |env| env.frame_number()), Ok(0));
    }

    #[test]
    fn remove_while_in_use_is_busy() {
        let (_dir, handle) = register();

        let result = with(handle, |_| remove(handle)).unwrap();
        assert_eq!(result, Err(RegistryError::Busy(handle)));
        assert!(contains(handle));

        assert_eq!(remove(handle), Ok(()));
        assert!(!contains(handle));
        assert_eq!(remove(handle), Err(RegistryError::UnknownHandle(handle)));
        assert_eq!(with(handle, |_| ()), Err(RegistryError::UnknownHandle(handle)));
    }

    #[test]
    fn handles_are_unique() {
        let (_dir, first) = register();
        let (_other, second) = register();

        assert_ne!(first, second);
        assert_ne!(first, 0);
        assert_eq!(remove(first), Ok(()));
        assert_eq!(remove(second), Ok(()));
    }
}
