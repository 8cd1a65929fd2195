#![no_main]

use interview_converter::diagnostics::Diagnostics;
use interview_converter::script::{SymbolTable, rewrite_macros, substitute};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut symbols = SymbolTable::new();
    symbols.add_variable("Client name TE");
    symbols.add_computation("Total CO");

    let mut diagnostics = Diagnostics::new();
    let _ = substitute(text, &symbols, &mut diagnostics);
    let _ = rewrite_macros(text);
});
