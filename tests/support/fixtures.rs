//! Test fixtures and constants.

/// A 24-word dictionary: exactly as many words as a key has.
pub const NATO: [&str; 24] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
    "kilo", "lima", "mike", "november", "oscar", "papa", "quebec", "romeo", "sierra", "tango",
    "uniform", "victor", "whiskey", "xray",
];

/// Machine id the test environment seals against.
pub const MACHINE_ID: &str = "4c4c4544003957108052b4c04f4e4d32";

/// Machine id of "another" host.
pub const OTHER_MACHINE_ID: &str = "9f86d081884c7d659a2feaa0c55ad015";
