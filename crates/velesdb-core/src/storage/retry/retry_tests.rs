//! Tests for the `retry` module

use super::*;
use std::cell::Cell;

#[test]
fn test_succeeds_immediately_without_sleeping() {
    // Arrange
    let calls = Cell::new(0);

    // Act
    let result = with_io_retry(3, || {
        calls.set(calls.get() + 1);
        Ok(42)
    });

    // Assert
    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_retries_io_errors_until_success() {
    // Arrange
    let calls = Cell::new(0);

    // Act
    let result = with_io_retry(3, || {
        calls.set(calls.get() + 1);
        if calls.get() < 3 {
            Err(Error::Io(std::io::Error::other("transient")))
        } else {
            Ok(())
        }
    });

    // Assert
    assert!(result.is_ok());
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_exhausts_retries_and_surfaces_the_error() {
    // Arrange
    let calls = Cell::new(0);

    // Act
    let result: Result<()> = with_io_retry(2, || {
        calls.set(calls.get() + 1);
        Err(Error::Io(std::io::Error::other("still failing")))
    });

    // Assert
    assert!(matches!(result, Err(Error::Io(_))));
    assert_eq!(calls.get(), 3); // first attempt plus 2 retries
}

#[test]
fn test_non_io_errors_are_not_retried() {
    // Arrange
    let calls = Cell::new(0);

    // Act
    let result: Result<()> = with_io_retry(5, || {
        calls.set(calls.get() + 1);
        Err(Error::InvalidArgument("bad input".into()))
    });

    // Assert
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(calls.get(), 1);
}
