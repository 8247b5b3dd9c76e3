//! Tests for the Meta Business client.



#[cfg(test)]
mod services_tests;
