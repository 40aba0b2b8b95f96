use std::fs;
use std::path::Path;

fn shader_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src/gfx/shaders")
}

fn parse(name: &str) -> naga::Module {
    let path = shader_dir().join(name);
    let source = fs::read_to_string(&path).unwrap();
    match naga::front::wgsl::parse_str(&source) {
        Ok(module) => module,
        Err(e) => panic!("Failed to parse {name}:\n{}", e.emit_to_string(&source)),
    }
}

fn validate(name: &str, module: &naga::Module) {
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    if let Err(e) = validator.validate(module) {
        panic!("Failed to validate {name}:\n{e:?}");
    }
}

fn entry_point<'a>(module: &'a naga::Module, name: &str) -> &'a naga::EntryPoint {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == name)
        .unwrap_or_else(|| panic!("missing entry point {name}"))
}

#[test]
fn validate_all_shaders() {
    let mut count = 0;
    for entry in fs::read_dir(shader_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().is_some_and(|ext| ext == "wgsl") {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            let module = parse(&name);
            validate(&name, &module);
            count += 1;
        }
    }
    assert_eq!(count, 2);
}

#[test]
fn step_shader_uses_8x8_workgroups() {
    let module = parse("life_step.wgsl");
    let step = entry_point(&module, "step_main");
    assert_eq!(step.stage, naga::ShaderStage::Compute);
    assert_eq!(step.workgroup_size, [8, 8, 1]);
    assert_eq!(step.workgroup_size[0], lifegrid::simulation::gpu::WORKGROUP_SIZE);
}

#[test]
fn cell_shader_has_vertex_and_fragment_stages() {
    let module = parse("cells.wgsl");
    assert_eq!(entry_point(&module, "vs_main").stage, naga::ShaderStage::Vertex);
    assert_eq!(entry_point(&module, "fs_main").stage, naga::ShaderStage::Fragment);
}

#[test]
fn params_block_matches_host_layout() {
    let module = parse("life_step.wgsl");
    let mut layouter = naga::proc::Layouter::default();
    layouter.update(module.to_ctx()).unwrap();

    let (handle, _) = module
        .types
        .iter()
        .find(|(_, ty)| ty.name.as_deref() == Some("SimParams"))
        .expect("SimParams struct");
    assert_eq!(
        layouter[handle].size as usize,
        std::mem::size_of::<lifegrid::simulation::gpu::SimParams>()
    );
}
