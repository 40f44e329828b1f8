use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use common::{Block, OpRecord};
use ink_core::art::{self, ArtError};
use ink_core::gossip::{self, BlockReceipt};
use ink_core::{confirm, InkMinerCore};
use p2p::Roster;

use crate::api_definitions::*;
use crate::Config;

/// Peer context threaded through every RPC handler
///
/// Handlers are straight-line routines over this value; there is no global
/// state anywhere in the server
pub struct Peer {
    /// The shared miner state
    pub core: InkMinerCore,
    /// Current gossip neighbors
    pub roster: Roster,
    /// Upper bound on one N-confirmation wait
    pub confirm_deadline: Duration,
}

#[derive(serde::Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug)]
enum Failure {
    MethodNotFound(String),
    InvalidParams(String),
    Art(ArtError),
}

impl From<ArtError> for Failure {
    fn from(err: ArtError) -> Self {
        Failure::Art(err)
    }
}

impl Failure {
    fn code_and_message(&self) -> (i64, String) {
        match self {
            Failure::MethodNotFound(method) => (-32601, format!("Method not found: {}", method)),
            Failure::InvalidParams(message) => (-32602, message.clone()),
            Failure::Art(err) => (1, err.to_string()),
        }
    }
}

fn parse<T: DeserializeOwned>(params: Value) -> Result<T, Failure> {
    serde_json::from_value(params).map_err(|err| Failure::InvalidParams(err.to_string()))
}

fn to_value<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).expect("response serialization cannot fail")
}

/// Serves the RPC surface until the process exits
pub async fn run(config: &Config, peer: Arc<Peer>) -> hyper::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.rpc_bind_port));

    let make_svc = make_service_fn(move |_| {
        let peer = peer.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |request| handle(peer.clone(), request)))
        }
    });

    let server = Server::bind(&addr).serve(make_svc);
    log::info!("RPC server listening on {}", addr);
    server.await
}

async fn handle(peer: Arc<Peer>, request: Request<Body>) -> Result<Response<Body>, Infallible> {
    if request.method() != Method::POST {
        let response = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("Endpoint not found"))
            .expect("static response cannot fail");
        return Ok(response);
    }

    let bytes = match hyper::body::to_bytes(request.into_body()).await {
        Ok(bytes) => bytes,
        Err(err) => {
            log::debug!("Could not read a request body: {}", err);
            return Ok(error_response(Value::Null, -32700, "Parse error"));
        }
    };
    let request: RpcRequest = match serde_json::from_slice(&bytes) {
        Ok(request) => request,
        Err(_) => return Ok(error_response(Value::Null, -32700, "Parse error")),
    };

    let id = request.id.clone();
    let response = match dispatch(&peer, &request.method, request.params).await {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(failure) => {
            let (code, message) = failure.code_and_message();
            return Ok(error_response(id, code, &message));
        }
    };
    Ok(json_response(response))
}

fn json_response(body: Value) -> Response<Body> {
    Response::builder()
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("static response cannot fail")
}

fn error_response(id: Value, code: i64, message: &str) -> Response<Body> {
    json_response(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    }))
}

async fn dispatch(peer: &Arc<Peer>, method: &str, params: Value) -> Result<Value, Failure> {
    match method {
        "MServer.DisseminateOperation" => {
            let op: OpRecord = parse(params)?;
            if gossip::receive_operation(&peer.core, op.clone()) {
                spawn_op_fan_out(peer, op);
            }
            Ok(json!(true))
        }

        "MServer.DisseminateBlock" => {
            let block: Block = parse(params)?;
            receive_block_reconciling(peer, block).await;
            Ok(json!(true))
        }

        "MServer.GetBlockChain" => {
            let chain = {
                let blockchain = peer.core.blockchain();
                let blockchain = blockchain.read().unwrap();
                blockchain.chain().clone()
            };
            Ok(to_value(chain))
        }

        "MArtNode.OpenCanvas" => {
            let request: OpenCanvasRequest = parse(params)?;
            let settings = art::open_canvas(&peer.core, &request.priv_key)?;
            Ok(to_value(settings))
        }

        "MArtNode.AddShape" => {
            let request: AddShapeRequest = parse(params)?;
            add_shape(peer, request).await
        }

        "MArtNode.DeleteShape" => {
            let request: DeleteShapeRequest = parse(params)?;
            delete_shape(peer, request).await
        }

        "MArtNode.GetInk" => Ok(json!(art::get_ink(&peer.core))),

        "MArtNode.GetSvgString" => {
            let request: GetSvgStringRequest = parse(params)?;
            Ok(json!(art::get_svg_string(&peer.core, &request.shape_hash)?))
        }

        "MArtNode.GetShapes" => {
            let request: BlockHashRequest = parse(params)?;
            Ok(to_value(art::get_shapes(&peer.core, &request.block_hash)?))
        }

        "MArtNode.GetGenesisBlock" => Ok(to_value(art::get_genesis_block(&peer.core))),

        "MArtNode.GetChildren" => {
            let request: BlockHashRequest = parse(params)?;
            Ok(to_value(art::get_children(&peer.core, &request.block_hash)?))
        }

        other => Err(Failure::MethodNotFound(other.to_string())),
    }
}

/// Commits a gossiped block, reconciling with the neighbors once when its
/// parent is unknown
async fn receive_block_reconciling(peer: &Arc<Peer>, block: Block) {
    match gossip::receive_block(&peer.core, &block) {
        BlockReceipt::Accepted(_) => spawn_block_fan_out(peer, block),
        BlockReceipt::NeedsParent(_) => {
            let chains = p2p::gossip::fetch_blockchains(&peer.roster).await;
            gossip::reconcile(&peer.core, chains);
            if let BlockReceipt::Accepted(_) = gossip::receive_block(&peer.core, &block) {
                spawn_block_fan_out(peer, block);
            }
        }
        BlockReceipt::AlreadyKnown | BlockReceipt::Rejected => {}
    }
}

fn spawn_op_fan_out(peer: &Arc<Peer>, op: OpRecord) {
    let roster = peer.roster.clone();
    tokio::spawn(async move {
        p2p::gossip::disseminate_operation(&roster, &op).await;
    });
}

fn spawn_block_fan_out(peer: &Arc<Peer>, block: Block) {
    let roster = peer.roster.clone();
    tokio::spawn(async move {
        p2p::gossip::disseminate_block(&roster, &block).await;
    });
}

async fn add_shape(peer: &Arc<Peer>, request: AddShapeRequest) -> Result<Value, Failure> {
    let submitted = art::submit_add_shape(
        &peer.core,
        &request.svg_string,
        &request.fill,
        &request.stroke,
    )?;

    // The record may already have been mined out of the pool; only a still
    // pending one needs fanning out
    let pending = {
        let oppool = peer.core.oppool();
        let oppool = oppool.read().unwrap();
        oppool.get_op(&submitted.shape_hash).cloned()
    };
    if let Some(op) = pending {
        p2p::gossip::disseminate_operation(&peer.roster, &op).await;
    }

    let block_hash = confirm::await_confirmation(
        &peer.core,
        submitted.shape_hash,
        request.validate_num,
        peer.confirm_deadline,
    )
    .await?;

    Ok(to_value(NewShapeResponse {
        shape_hash: submitted.shape_hash,
        block_hash,
        ink_remaining: art::get_ink(&peer.core),
    }))
}

async fn delete_shape(peer: &Arc<Peer>, request: DeleteShapeRequest) -> Result<Value, Failure> {
    let op_hash = art::submit_delete_shape(&peer.core, &request.shape_hash)?;

    let pending = {
        let oppool = peer.core.oppool();
        let oppool = oppool.read().unwrap();
        oppool.get_op(&op_hash).cloned()
    };
    if let Some(op) = pending {
        p2p::gossip::disseminate_operation(&peer.roster, &op).await;
    }

    confirm::await_confirmation(&peer.core, op_hash, request.validate_num, peer.confirm_deadline)
        .await?;

    Ok(json!(art::get_ink(&peer.core)))
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use common::{CanvasSettings, GetHash, MinerNetSettings};
    use crypto::{Hash128, KeyPair};
    use ink_core::miner;

    use super::*;

    fn settings() -> MinerNetSettings {
        MinerNetSettings {
            genesis_block_hash: Hash128::try_from("83218ac34c1834c26781fe4bde918ee4").unwrap(),
            min_num_miner_connections: 3,
            ink_per_op_block: 20,
            ink_per_noop_block: 10,
            heartbeat_ms: 2000,
            pow_difficulty_op_block: 1,
            pow_difficulty_noop_block: 1,
            canvas_settings: CanvasSettings {
                canvas_x_max: 200,
                canvas_y_max: 200,
            },
        }
    }

    fn peer() -> Arc<Peer> {
        Arc::new(Peer {
            core: InkMinerCore::new(settings(), KeyPair::generate()),
            roster: Roster::new(),
            confirm_deadline: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    async fn unknown_methods_are_reported() {
        let failure = dispatch(&peer(), "MServer.Nonsense", Value::Null)
            .await
            .err()
            .unwrap();
        assert_eq!(failure.code_and_message().0, -32601);
    }

    #[tokio::test]
    async fn get_ink_answers_zero_on_a_fresh_chain() {
        let result = dispatch(&peer(), "MArtNode.GetInk", Value::Null)
            .await
            .unwrap();
        assert_eq!(result, json!(0));
    }

    #[tokio::test]
    async fn disseminate_operation_admits_to_the_pool() {
        let peer = peer();
        miner::mine_once(&peer.core).unwrap();

        let op = OpRecord::signed(
            geometry::svg_path_string("M 0 0 L 10 0", "green", "transparent"),
            10,
            peer.core.keypair(),
        );
        let params = to_value(&op);
        let result = dispatch(&peer, "MServer.DisseminateOperation", params)
            .await
            .unwrap();
        assert_eq!(result, json!(true));
        assert!(peer.core.oppool().read().unwrap().has_op(&op.get_hash()));
    }

    #[tokio::test]
    async fn disseminate_block_commits_valid_blocks() {
        let peer = peer();
        let foreign = InkMinerCore::new(settings(), KeyPair::generate());
        let block = miner::mine_once(&foreign).unwrap();

        dispatch(&peer, "MServer.DisseminateBlock", to_value(&block))
            .await
            .unwrap();
        let blockchain = peer.core.blockchain();
        let blockchain = blockchain.read().unwrap();
        assert_eq!(blockchain.tip_hash(), block.get_hash());
    }

    #[tokio::test]
    async fn get_blockchain_round_trips() {
        let peer = peer();
        miner::mine_once(&peer.core).unwrap();

        let result = dispatch(&peer, "MServer.GetBlockChain", Value::Null)
            .await
            .unwrap();
        let chain: blockchain::BlockChain = serde_json::from_value(result).unwrap();
        assert_eq!(chain.tip_num(), 1);
    }

    #[tokio::test]
    async fn art_errors_surface_their_wire_names() {
        let peer = peer();
        let request = to_value(AddShapeRequest {
            validate_num: 0,
            shape_type: ShapeType::Path,
            svg_string: "M 0 0 L 500 0".to_string(),
            fill: "transparent".to_string(),
            stroke: "green".to_string(),
        });

        let failure = dispatch(&peer, "MArtNode.AddShape", request)
            .await
            .err()
            .unwrap();
        assert_eq!(failure.code_and_message().1, "OUTOFBOUNDS");
    }

    #[tokio::test]
    async fn add_shape_confirms_against_a_mining_peer() {
        let peer = peer();
        for _ in 0..3 {
            miner::mine_once(&peer.core).unwrap();
        }

        let request = to_value(AddShapeRequest {
            validate_num: 0,
            shape_type: ShapeType::Path,
            svg_string: "M 130 20 L 160 20".to_string(),
            fill: "transparent".to_string(),
            stroke: "green".to_string(),
        });

        // Mine the pool out from under the waiting request
        let core = peer.core.clone();
        let mining = tokio::spawn(async move {
            loop {
                if !core.oppool().read().unwrap().is_empty() {
                    miner::mine_once(&core).unwrap();
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });

        let result = dispatch(&peer, "MArtNode.AddShape", request).await.unwrap();
        let response: NewShapeResponse = serde_json::from_value(result).unwrap();
        assert_eq!(response.ink_remaining, 30 + 20 - 30);
        mining.await.unwrap();
    }
}
