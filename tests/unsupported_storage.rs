use std::env;

use dynvec::{DynVecError, Scalar, StorageKind, arange};

/// Mutates the process environment, so it lives in its own integration
/// binary where no other test can run concurrently.
#[test]
fn disabled_device_reports_unsupported_storage() {
    // SAFETY: this binary contains exactly one test; nothing else reads or
    // writes the environment while it runs.
    unsafe { env::set_var("DYNVEC_DISABLE_DEVICE", "1") };

    for kind in [StorageKind::Device, StorageKind::Managed] {
        assert!(!kind.is_available());
        let result = arange(kind, Scalar::from(4i32));
        assert!(matches!(
            result,
            Err(DynVecError::UnsupportedStorage(k)) if k == kind
        ));
    }

    // host storage is unaffected by the switch
    let v = arange(StorageKind::Host, Scalar::from(4i32)).unwrap();
    assert_eq!(v.to_vec::<i32>().unwrap(), vec![0, 1, 2, 3]);
}
