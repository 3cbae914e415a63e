//! Build script for compiling the Open Match protobuf definitions.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_files = [
        "../../proto/api/messages.proto",
        "../../proto/api/backend.proto",
        "../../proto/api/frontend.proto",
        "../../proto/api/query.proto",
        "../../proto/api/matchfunction.proto",
        "../../proto/api/evaluator.proto",
    ];

    // Vendored protoc so builds don't depend on a system install
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    let includes = [
        std::path::PathBuf::from("../../proto"),
        protoc_bin_vendored::include_path()?,
    ];

    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&proto_files, &includes)?;

    for file in &proto_files {
        println!("cargo:rerun-if-changed={file}");
    }

    Ok(())
}
