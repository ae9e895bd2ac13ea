//! C entry points of the external scanner, with the names and signatures the
//! generated `parser.c` of the Stata grammar links against.
//!
//! Everything here is a thin shim over [`Scanner`]: the payload handed to the
//! host is a boxed scanner, and the host lexer is wrapped into something
//! implementing [`Lexer`].

use crate::scanner::{Lexer, Scanner, ValidSymbols, EXTERNAL_TOKEN_COUNT};
use log::warn;
use std::os::raw::{c_char, c_void};

/// Size of the buffer the host hands to `serialize`
pub const SERIALIZATION_BUFFER_SIZE: usize = 1024;

/// Mirror of the host's lexer interface. Only the leading fields are declared,
/// the host owns the allocation.
#[repr(C)]
pub struct TSLexer {
    pub lookahead: i32,
    pub result_symbol: u16,
    pub advance: unsafe extern "C" fn(*mut TSLexer, bool),
    pub mark_end: unsafe extern "C" fn(*mut TSLexer),
    pub get_column: unsafe extern "C" fn(*mut TSLexer) -> u32,
    pub is_at_included_range_start: unsafe extern "C" fn(*const TSLexer) -> bool,
    pub eof: unsafe extern "C" fn(*const TSLexer) -> bool,
}

struct HostLexer {
    raw: *mut TSLexer,
}

impl Lexer for HostLexer {
    fn lookahead(&self) -> Option<char> {
        // SAFETY: `raw` is the non-null lexer the host passed to `scan`, valid for the call
        let (lookahead, at_eof) = unsafe { ((*self.raw).lookahead, ((*self.raw).eof)(self.raw)) };

        if lookahead == 0 && at_eof {
            return None;
        }

        Some(std::char::from_u32(lookahead as u32).unwrap_or(std::char::REPLACEMENT_CHARACTER))
    }

    fn advance(&mut self, skip: bool) {
        // SAFETY: see `lookahead`
        unsafe { ((*self.raw).advance)(self.raw, skip) }
    }
}

#[no_mangle]
pub extern "C" fn tree_sitter_stata_external_scanner_create() -> *mut c_void {
    Box::into_raw(Box::new(Scanner::new())) as *mut c_void
}

/// # Safety
///
/// `payload` must come from `tree_sitter_stata_external_scanner_create` and
/// must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn tree_sitter_stata_external_scanner_destroy(payload: *mut c_void) {
    if !payload.is_null() {
        drop(Box::from_raw(payload as *mut Scanner));
    }
}

/// # Safety
///
/// `payload` must be a live scanner and `buffer` must point to at least
/// `SERIALIZATION_BUFFER_SIZE` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn tree_sitter_stata_external_scanner_serialize(
    payload: *mut c_void,
    buffer: *mut c_char,
) -> u32 {
    let scanner = match (payload as *const Scanner).as_ref() {
        Some(scanner) => scanner,
        None => {
            warn!("serialize called without a scanner");
            return 0;
        }
    };

    if buffer.is_null() {
        return 0;
    }

    let buffer = std::slice::from_raw_parts_mut(buffer as *mut u8, SERIALIZATION_BUFFER_SIZE);
    scanner.serialize(buffer) as u32
}

/// # Safety
///
/// `payload` must be a live scanner and `buffer` must point to `length`
/// readable bytes.
#[no_mangle]
pub unsafe extern "C" fn tree_sitter_stata_external_scanner_deserialize(
    payload: *mut c_void,
    buffer: *const c_char,
    length: u32,
) {
    let scanner = match (payload as *mut Scanner).as_mut() {
        Some(scanner) => scanner,
        None => {
            warn!("deserialize called without a scanner");
            return;
        }
    };

    if buffer.is_null() || length == 0 {
        scanner.deserialize(&[]);
    } else {
        scanner.deserialize(std::slice::from_raw_parts(
            buffer as *const u8,
            length as usize,
        ));
    }
}

/// # Safety
///
/// `payload` must be a live scanner, `lexer` the host lexer and
/// `valid_symbols` an array with one entry per external token.
#[no_mangle]
pub unsafe extern "C" fn tree_sitter_stata_external_scanner_scan(
    payload: *mut c_void,
    lexer: *mut TSLexer,
    valid_symbols: *const bool,
) -> bool {
    let scanner = match (payload as *mut Scanner).as_mut() {
        Some(scanner) => scanner,
        None => return false,
    };

    if lexer.is_null() || valid_symbols.is_null() {
        return false;
    }

    let flags = std::slice::from_raw_parts(valid_symbols, EXTERNAL_TOKEN_COUNT);
    let mut host = HostLexer { raw: lexer };

    match scanner.scan(&mut host, ValidSymbols::new(flags)) {
        Some(token) => {
            (*lexer).result_symbol = token.symbol();
            true
        }
        None => false,
    }
}
