mod cursor_tests;
mod sanitize_tests;
