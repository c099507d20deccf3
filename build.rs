fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure()
        .build_client(true)
        .build_server(false)
        .compile_protos(
            &[
                "fabric-protos/gateway/gateway.proto",
                "fabric-protos/common/common.proto",
                "fabric-protos/peer/chaincode.proto",
                "fabric-protos/peer/proposal.proto",
                "fabric-protos/peer/proposal_response.proto",
                "fabric-protos/peer/transaction.proto",
                "fabric-protos/msp/identities.proto",
                "fabric-protos/google/rpc/status.proto",
            ],
            &["fabric-protos"],
        )?;
    Ok(())
}
