mod hook_tests;
mod lifecycle_tests;
mod synthesis_tests;
