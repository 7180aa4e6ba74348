mod defer_tests;
mod operation_compiler_tests;
mod optimizer_tests;
