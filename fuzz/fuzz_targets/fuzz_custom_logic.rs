#![no_main]

use libfuzzer_sys::fuzz_target;
use recordquery_core::LogicExpr;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Parsing must never panic; a parsed expression must reprint to the same tree
        if let Ok(expr) = LogicExpr::parse(text) {
            let reparsed = LogicExpr::parse(&expr.to_string());
            assert_eq!(reparsed.as_ref(), Ok(&expr));

            if expr.max_index() <= 1024 {
                let results = vec![true; expr.max_index()];
                assert!(expr.evaluate(&results).is_some());
            }
        }
    }
});
