//! hostpanel protocol - protobuf types for the authentication service

/// Generated protobuf types
pub mod auth {
    pub mod v1 {
        tonic::include_proto!("hostpanel.auth.v1");
    }
}

pub use auth::v1::*;

/// File descriptor set for gRPC reflection
pub const FILE_DESCRIPTOR_SET: &[u8] =
    tonic::include_file_descriptor_set!("hostpanel_descriptor");
