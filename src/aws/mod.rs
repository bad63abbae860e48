pub mod bedrock;
pub mod sigv4;

pub use bedrock::BedrockRuntime;
pub use sigv4::SigV4Signer;
