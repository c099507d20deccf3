#[cfg(test)]
mod transaction_test {
    use std::sync::Arc;

    use prost::Message;

    use crate::{
        checkpoint::{Checkpointer, InMemoryCheckpointer},
        envelope::DecodedResult,
        error::{BuilderError, RpcError, SubmitError},
        fabric::{
            common::{Envelope, Payload},
            gateway::{CommitStatusRequest, CommitStatusResponse, EndorseResponse, EvaluateResponse},
            protos::TxValidationCode,
        },
        tests::mock::{
            Call, MockConnection, RecordingSigner, block_on, chaincode_response,
            endorsed_envelope, mock_signature, test_client, test_identity,
        },
    };

    fn endorsing_connection(result: &[u8]) -> MockConnection {
        MockConnection {
            endorse_response: EndorseResponse {
                prepared_transaction: Some(endorsed_envelope(&[chaincode_response(result)])),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_evaluate_transaction() {
        let connection = Arc::new(MockConnection {
            evaluate_response: EvaluateResponse {
                result: Some(chaincode_response(b"asset1")),
            },
            ..Default::default()
        });
        let signer = Arc::new(RecordingSigner::default());
        let client = test_client(connection.clone(), Some(signer.clone()));
        let contract = client.get_network("mychannel").unwrap().get_contract("basic");

        let result = block_on(contract.evaluate_transaction("ReadAsset", ["asset1"])).unwrap();
        assert_eq!(result, b"asset1".to_vec());

        let calls = connection.calls();
        assert_eq!(calls.len(), 1);
        let Call::Evaluate(request) = &calls[0] else {
            panic!("expected evaluate, got {:?}", calls[0]);
        };
        assert_eq!(request.channel_id, "mychannel");
        let proposal = request.proposal.as_ref().unwrap();
        assert_eq!(signer.messages(), vec![proposal.proposal_bytes.clone()]);
        assert_eq!(proposal.signature, mock_signature(&proposal.proposal_bytes));
    }

    #[test]
    fn test_submit_transaction() {
        let connection = Arc::new(endorsing_connection(b"created"));
        let signer = Arc::new(RecordingSigner::default());
        let client = test_client(connection.clone(), Some(signer.clone()));
        let contract = client.get_network("mychannel").unwrap().get_contract("basic");

        let result = block_on(contract.submit_transaction(
            "CreateAsset",
            ["asset7", "orange", "10", "Frank", "600"],
        ))
        .unwrap();
        assert_eq!(result, b"created".to_vec());

        let calls = connection.calls();
        assert_eq!(calls.len(), 2);
        let (Call::Endorse(endorse), Call::Submit(submit)) = (&calls[0], &calls[1]) else {
            panic!("expected endorse then submit, got {:?}", calls);
        };
        assert_eq!(endorse.transaction_id, submit.transaction_id);
        assert_eq!(submit.channel_id, "mychannel");

        let proposal = endorse.proposed_transaction.as_ref().unwrap();
        let envelope = submit.prepared_transaction.as_ref().unwrap();
        assert_eq!(
            signer.messages(),
            vec![proposal.proposal_bytes.clone(), envelope.payload.clone()]
        );
    }

    #[test]
    fn test_submit_signs_prepared_envelope_payload() {
        let payload = b"prepared-envelope-payload".to_vec();
        let connection = Arc::new(MockConnection {
            endorse_response: EndorseResponse {
                prepared_transaction: Some(Envelope {
                    payload: payload.clone(),
                    signature: vec![],
                }),
            },
            ..Default::default()
        });
        let signer = Arc::new(RecordingSigner::default());
        let client = test_client(connection.clone(), Some(signer.clone()));
        let contract = client.get_network("mychannel").unwrap().get_contract("basic");

        block_on(async {
            let builder = contract.proposal_builder("CreateAsset").unwrap();
            let transaction = contract.new_proposal(builder).unwrap().endorse().await.unwrap();

            // Raw bytes are not a Payload message
            assert!(matches!(
                transaction.decoded_result(),
                DecodedResult::Malformed(_)
            ));
            assert!(transaction.result().is_empty());
            assert!(transaction.envelope().signature.is_empty());

            let submitted = transaction.submit().await.unwrap();
            assert!(submitted.result().is_empty());
        });

        let calls = connection.calls();
        assert_eq!(calls.len(), 2);
        let Call::Submit(submit) = &calls[1] else {
            panic!("expected submit, got {:?}", calls[1]);
        };
        let envelope = submit.prepared_transaction.as_ref().unwrap();
        assert_eq!(envelope.payload, payload);
        assert!(!envelope.signature.is_empty());
        assert_eq!(envelope.signature, mock_signature(b"prepared-envelope-payload"));
        assert_eq!(signer.messages().last(), Some(&payload));
    }

    #[test]
    fn test_unparsable_transaction_data_has_empty_result() {
        let prepared = Envelope {
            payload: Payload {
                header: None,
                data: b"prepared-envelope-payload".to_vec(),
            }
            .encode_to_vec(),
            signature: vec![],
        };
        let connection = Arc::new(MockConnection {
            endorse_response: EndorseResponse {
                prepared_transaction: Some(prepared.clone()),
            },
            ..Default::default()
        });
        let client = test_client(connection.clone(), Some(Arc::new(RecordingSigner::default())));
        let contract = client.get_network("mychannel").unwrap().get_contract("basic");

        let submitted = block_on(contract.submit_async("CreateAsset", ["asset7"])).unwrap();
        assert!(submitted.result().is_empty());

        let calls = connection.calls();
        let Call::Submit(submit) = &calls[1] else {
            panic!("expected submit, got {:?}", calls[1]);
        };
        let envelope = submit.prepared_transaction.as_ref().unwrap();
        assert_eq!(envelope.signature, mock_signature(&prepared.payload));
    }

    #[test]
    fn test_endorse_submit_and_commit_status() {
        let connection = Arc::new(MockConnection {
            commit_status_response: CommitStatusResponse {
                result: TxValidationCode::Valid as i32,
                block_number: 42,
            },
            ..endorsing_connection(b"transferred")
        });
        let signer = Arc::new(RecordingSigner::default());
        let checkpointer = Arc::new(InMemoryCheckpointer::new());
        let client = test_client(connection.clone(), Some(signer.clone()));
        let network = client
            .get_network("mychannel")
            .unwrap()
            .with_checkpointer(checkpointer.clone());
        let contract = network.get_contract_with_name("basic", "assets");

        block_on(async {
            let builder = contract
                .proposal_builder("TransferAsset")
                .unwrap()
                .with_function_args(["asset1", "Christopher"])
                .unwrap();
            let proposal = contract.new_proposal(builder).unwrap();
            let transaction_id = proposal.transaction_id().to_string();

            let transaction = proposal.endorse().await.unwrap();
            assert_eq!(transaction.transaction_id(), transaction_id);
            assert_eq!(transaction.result(), b"transferred");

            let submitted = transaction.submit().await.unwrap();
            assert_eq!(submitted.transaction_id(), transaction_id);

            let status = submitted.status().await.unwrap();
            assert!(status.is_successful());
            assert_eq!(status.block_number, 42);
            assert_eq!(status.transaction_id, transaction_id);
            assert_eq!(checkpointer.block_number(), Some(42));
            assert_eq!(checkpointer.transaction_id(), Some(transaction_id.clone()));

            let calls = connection.calls();
            assert_eq!(calls.len(), 3);
            let Call::CommitStatus(signed) = &calls[2] else {
                panic!("expected commit status, got {:?}", calls[2]);
            };
            let request = CommitStatusRequest::decode(signed.request.as_slice()).unwrap();
            assert_eq!(request.transaction_id, transaction_id);
            assert_eq!(request.channel_id, "mychannel");
            assert_eq!(request.identity, test_identity().serialized());
            assert_eq!(signed.signature, mock_signature(&signed.request));
        });
        assert_eq!(signer.messages().len(), 3);
    }

    #[test]
    fn test_invalid_commit_is_not_checkpointed() {
        let connection = Arc::new(MockConnection {
            commit_status_response: CommitStatusResponse {
                result: TxValidationCode::MvccReadConflict as i32,
                block_number: 9,
            },
            ..endorsing_connection(b"")
        });
        let checkpointer = Arc::new(InMemoryCheckpointer::new());
        let client = test_client(connection, Some(Arc::new(RecordingSigner::default())));
        let contract = client
            .get_network("mychannel")
            .unwrap()
            .with_checkpointer(checkpointer.clone())
            .get_contract("basic");

        let status = block_on(async {
            let submitted = contract.submit_async("UpdateAsset", ["asset1"]).await?;
            let status = submitted.status().await?;
            Ok::<_, SubmitError>(status)
        })
        .unwrap();
        assert!(!status.is_successful());
        assert_eq!(status.code, TxValidationCode::MvccReadConflict);
        assert_eq!(checkpointer.block_number(), None);
    }

    #[test]
    fn test_unknown_validation_code() {
        let connection = Arc::new(MockConnection {
            commit_status_response: CommitStatusResponse {
                result: 9999,
                block_number: 1,
            },
            ..endorsing_connection(b"")
        });
        let client = test_client(connection, Some(Arc::new(RecordingSigner::default())));
        let contract = client.get_network("mychannel").unwrap().get_contract("basic");

        let status = block_on(async {
            contract
                .submit_async("UpdateAsset", ["asset1"])
                .await?
                .status()
                .await
        })
        .unwrap();
        assert_eq!(status.code, TxValidationCode::InvalidOtherReason);
    }

    #[test]
    fn test_missing_signer_fails_before_any_call() {
        let connection = Arc::new(endorsing_connection(b"unused"));
        let client = test_client(connection.clone(), None);
        let contract = client.get_network("mychannel").unwrap().get_contract("basic");

        let is_missing_signer = |result: &SubmitError| {
            matches!(
                result,
                SubmitError::Configuration(BuilderError::MissingParameter(name)) if name == "signer"
            )
        };

        let evaluated = block_on(contract.evaluate_transaction("ReadAsset", ["asset1"]));
        assert!(is_missing_signer(&evaluated.unwrap_err()));

        let submitted = block_on(contract.submit_transaction("CreateAsset", ["asset1"]));
        assert!(is_missing_signer(&submitted.unwrap_err()));

        let builder = contract.proposal_builder("ReadAsset").unwrap();
        match contract.new_proposal(builder) {
            Err(err) => assert!(is_missing_signer(&err)),
            Ok(_) => panic!("proposal built without a signer"),
        }

        assert!(connection.calls().is_empty());
    }

    #[test]
    fn test_rpc_failure_is_propagated() {
        let failure = RpcError::new(tonic::Code::Unavailable, "peer down");
        let connection = Arc::new(MockConnection {
            failure: Some(failure.clone()),
            ..Default::default()
        });
        let signer = Arc::new(RecordingSigner::default());
        let client = test_client(connection.clone(), Some(signer.clone()));
        let contract = client.get_network("mychannel").unwrap().get_contract("basic");

        match block_on(contract.submit_transaction("CreateAsset", ["asset1"])) {
            Err(SubmitError::Rpc(err)) => assert_eq!(err, failure),
            other => panic!("unexpected result: {:?}", other),
        }
        // Submission never starts after a failed endorsement
        assert_eq!(connection.calls().len(), 1);
        assert_eq!(signer.messages().len(), 1);
    }

    #[test]
    fn test_empty_responses() {
        let connection = Arc::new(MockConnection::default());
        let client = test_client(connection.clone(), Some(Arc::new(RecordingSigner::default())));
        let contract = client.get_network("mychannel").unwrap().get_contract("basic");

        assert!(matches!(
            block_on(contract.evaluate_transaction("ReadAsset", ["asset1"])),
            Err(SubmitError::EmptyResponse)
        ));
        assert!(matches!(
            block_on(contract.submit_transaction("CreateAsset", ["asset1"])),
            Err(SubmitError::EmptyResponse)
        ));
        // No envelope means nothing to submit
        assert_eq!(connection.calls().len(), 2);
    }

    #[test]
    fn test_concurrent_invocations_share_a_client() {
        let connection = Arc::new(MockConnection {
            evaluate_response: EvaluateResponse {
                result: Some(chaincode_response(b"ok")),
            },
            ..Default::default()
        });
        let client = test_client(connection.clone(), Some(Arc::new(RecordingSigner::default())));
        let contract = client.get_network("mychannel").unwrap().get_contract("basic");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap();
        let results = runtime.block_on(async {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let contract = contract.clone();
                    tokio::spawn(async move {
                        contract
                            .evaluate_transaction("ReadAsset", [format!("asset{}", i)])
                            .await
                    })
                })
                .collect();
            let mut results = vec![];
            for handle in handles {
                results.push(handle.await.unwrap().unwrap());
            }
            results
        });

        assert_eq!(results.len(), 8);
        let mut transaction_ids: Vec<_> = connection
            .calls()
            .into_iter()
            .map(|call| match call {
                Call::Evaluate(request) => request.transaction_id,
                other => panic!("unexpected call {:?}", other),
            })
            .collect();
        transaction_ids.sort();
        transaction_ids.dedup();
        assert_eq!(transaction_ids.len(), 8);
    }
}
