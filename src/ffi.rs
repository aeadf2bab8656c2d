//! C ABI over [`StrategyHandle`].
//!
//! Handles and signals are heap allocations owned by the caller between the
//! create/free pairs. Null is never dereferenced: null arguments yield null
//! results, and freeing null does nothing.

use std::ffi::{c_char, CStr};
use std::ptr;

use chrono::Utc;
use tracing::warn;

use crate::bridge::{StrategyHandle, TradeSignal};
use crate::domain::strategy::StrategyKind;

/// Create a strategy from a NUL-terminated kind tag and `len` parameters.
///
/// Returns null for a null or non UTF-8 tag, an unknown kind, or a null
/// `params` with non-zero `len`.
///
/// # Safety
///
/// `kind` must be null or point to a NUL-terminated string. `params` must be
/// null or point to `len` readable `f64` values.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tradelab_strategy_create(
    kind: *const c_char,
    params: *const f64,
    len: usize,
) -> *mut StrategyHandle {
    if kind.is_null() || (params.is_null() && len > 0) {
        return ptr::null_mut();
    }

    let tag = unsafe { CStr::from_ptr(kind) };
    let kind = match tag.to_str().map(str::parse::<StrategyKind>) {
        Ok(Ok(kind)) => kind,
        Ok(Err(e)) => {
            warn!("{e}");
            return ptr::null_mut();
        }
        Err(e) => {
            warn!("strategy kind is not UTF-8: {e}");
            return ptr::null_mut();
        }
    };

    let params = if len == 0 {
        &[][..]
    } else {
        unsafe { std::slice::from_raw_parts(params, len) }
    };

    Box::into_raw(Box::new(StrategyHandle::new(kind, params)))
}

/// Release a handle from [`tradelab_strategy_create`].
///
/// # Safety
///
/// `handle` must be null or a pointer returned by
/// [`tradelab_strategy_create`] that has not been destroyed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tradelab_strategy_destroy(handle: *mut StrategyHandle) {
    if !handle.is_null() {
        drop(unsafe { Box::from_raw(handle) });
    }
}

/// Analyze `len` prices and return the most recent trade, or null when there
/// is none. A non-null result must be released with [`tradelab_signal_free`].
///
/// # Safety
///
/// `handle` must be null or a live handle not used concurrently by another
/// thread. `prices` must be null or point to `len` readable `f64` values.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tradelab_analyze(
    handle: *mut StrategyHandle,
    prices: *const f64,
    len: usize,
) -> *mut TradeSignal {
    if handle.is_null() || prices.is_null() {
        return ptr::null_mut();
    }

    let handle = unsafe { &mut *handle };
    let prices = unsafe { std::slice::from_raw_parts(prices, len) };

    match handle.analyze_prices(prices, Utc::now()) {
        Some(signal) => Box::into_raw(Box::new(signal)),
        None => ptr::null_mut(),
    }
}

/// Release a signal from [`tradelab_analyze`].
///
/// # Safety
///
/// `signal` must be null or a pointer returned by [`tradelab_analyze`] that
/// has not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tradelab_signal_free(signal: *mut TradeSignal) {
    if !signal.is_null() {
        drop(unsafe { Box::from_raw(signal) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::SignalSide;

    #[test]
    fn create_analyze_free() {
        let prices = [10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 10.0, 11.0];
        let params = [4.0, 2.0, 0.5];
        let before = Utc::now().timestamp();

        unsafe {
            let handle =
                tradelab_strategy_create(c"bbands".as_ptr(), params.as_ptr(), params.len());
            assert!(!handle.is_null());

            let signal = tradelab_analyze(handle, prices.as_ptr(), prices.len());
            assert!(!signal.is_null());
            assert_eq!((*signal).side, SignalSide::Sell);
            assert_eq!((*signal).price, 11.0);
            assert_eq!((*signal).amount, 1.0);
            assert!((*signal).timestamp < before);

            tradelab_signal_free(signal);
            tradelab_strategy_destroy(handle);
        }
    }

    #[test]
    fn no_signal_is_null() {
        let prices = [100.0; 30];
        unsafe {
            let handle = tradelab_strategy_create(c"rsi".as_ptr(), ptr::null(), 0);
            assert!(!handle.is_null());
            assert!(tradelab_analyze(handle, prices.as_ptr(), prices.len()).is_null());
            tradelab_strategy_destroy(handle);
        }
    }

    #[test]
    fn unknown_kind_is_null() {
        unsafe {
            assert!(tradelab_strategy_create(c"ichimoku".as_ptr(), ptr::null(), 0).is_null());
        }
    }

    #[test]
    fn null_arguments_are_tolerated() {
        let prices = [1.0, 2.0];
        unsafe {
            assert!(tradelab_strategy_create(ptr::null(), ptr::null(), 0).is_null());
            assert!(tradelab_strategy_create(c"macd".as_ptr(), ptr::null(), 4).is_null());
            assert!(tradelab_analyze(ptr::null_mut(), prices.as_ptr(), 2).is_null());

            let handle = tradelab_strategy_create(c"macd".as_ptr(), ptr::null(), 0);
            assert!(tradelab_analyze(handle, ptr::null(), 0).is_null());
            tradelab_strategy_destroy(handle);

            tradelab_strategy_destroy(ptr::null_mut());
            tradelab_signal_free(ptr::null_mut());
        }
    }
}
