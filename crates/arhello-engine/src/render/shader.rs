use super::RenderSetupError;

/// Parses and validates WGSL, and checks the entry points the pipeline links
/// against.
///
/// wgpu reports invalid shaders through its uncaptured-error handler, which
/// panics by default; validating first turns that into a `RenderSetupError`.
pub fn validate_wgsl(
    label: &'static str,
    source: &str,
    entry_points: &[&'static str],
) -> Result<(), RenderSetupError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| {
        RenderSetupError::ShaderCompile {
            label,
            message: e.emit_to_string(source),
        }
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| RenderSetupError::ShaderCompile {
        label,
        message: e.to_string(),
    })?;

    for &entry_point in entry_points {
        if !module.entry_points.iter().any(|ep| ep.name == entry_point) {
            return Err(RenderSetupError::ShaderLink { label, entry_point });
        }
    }

    Ok(())
}

/// Validates, then creates the wgpu shader module.
pub(super) fn compile_wgsl(
    device: &wgpu::Device,
    label: &'static str,
    source: &str,
    entry_points: &[&'static str],
) -> Result<wgpu::ShaderModule, RenderSetupError> {
    validate_wgsl(label, source, entry_points)?;

    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    }))
}
