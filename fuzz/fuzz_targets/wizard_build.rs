#![no_main]

use interview_converter::{InterviewConverter, WizardInterview};
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes must either fail to decode or convert without panicking
fuzz_target!(|data: &[u8]| {
    if let Ok(interview) = WizardInterview::from_bytes(data) {
        let output = InterviewConverter::new().convert(&interview);
        assert!(output.yaml.starts_with("---\n"));
    }
});
