//! Tests for generator services, with the HTTP API and inner clients faked
