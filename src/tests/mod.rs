// Test modules for HealthX chat
// Each module contains extracted unit tests for the corresponding source file

mod helpers;
