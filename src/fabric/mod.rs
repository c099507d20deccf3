//! Wire messages and the `gateway.Gateway` client, generated by `build.rs`
//! from the subset of fabric-protos under `fabric-protos/`.

pub mod common {
    tonic::include_proto!("common");
}

pub mod gateway {
    tonic::include_proto!("gateway");
}

pub mod msp {
    tonic::include_proto!("msp");
}

pub mod protos {
    tonic::include_proto!("protos");
}

/// `google.rpc.Status`, the payload of gRPC status details.
pub(crate) mod rpc {
    tonic::include_proto!("google.rpc");
}
