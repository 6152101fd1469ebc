// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate that a procurement ID is valid (positive integer)
pub fn validate_instance_id(id_str: &str) -> Result<i64, String> {
    id_str.parse::<i64>()
        .map_err(|_| format!("Invalid procurement ID: '{}'. Procurement ID must be a number.", id_str))
        .and_then(|id| {
            if id > 0 {
                Ok(id)
            } else {
                Err(format!("Invalid procurement ID: {}. Procurement ID must be positive.", id))
            }
        })
}

/// Validate a stage sequence number (1-based)
pub fn validate_sequence(sequence: u32) -> Result<u32, String> {
    if sequence == 0 {
        Err("Invalid stage number: 0. Stages are numbered from 1.".to_string())
    } else {
        Ok(sequence)
    }
}

/// Validate a budget amount in rupiah
pub fn validate_budget(budget: i64) -> Result<i64, String> {
    if budget < 0 {
        Err(format!("Invalid budget: {}. Budget cannot be negative.", budget))
    } else {
        Ok(budget)
    }
}
