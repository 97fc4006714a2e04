pub mod mock_biometric_service;

pub use mock_biometric_service::MockBiometricService;
