use crate::diagnostic::Diagnostic;
use crate::gpu::{groups_1d, launch, BufferSpec, GpuContext, KernelProgram};
use crate::harness::compare::check_close;
use crate::harness::data;
use crate::harness::registry::{TestCase, TestSuite};

pub const SUITE: TestSuite = TestSuite {
    name: "relu",
    tests: &[
        TestCase {
            name: "matches_host_reference",
            run: matches_host_reference,
        },
        TestCase {
            name: "negative_input_is_zeroed",
            run: negative_input_is_zeroed,
        },
    ],
};

fn matches_host_reference(ctx: &GpuContext, program: &KernelProgram) -> Result<(), Diagnostic> {
    const N: usize = 100;
    // Mix of positive and negative values.
    let input = data::uniform(N, -1.0, 1.0, 0x4e10_0001);
    let expected: Vec<f32> = input.iter().map(|&x| x.max(0.0)).collect();

    let outputs = launch(
        ctx,
        program,
        "relu",
        &[BufferSpec::InOut(&input)],
        &[N as u32],
        groups_1d(N),
    )?;
    check_close("relu", &expected, &outputs[0])
}

fn negative_input_is_zeroed(ctx: &GpuContext, program: &KernelProgram) -> Result<(), Diagnostic> {
    const N: usize = 64;
    let input = data::uniform(N, -10.0, -0.5, 0x4e10_0002);
    let expected = vec![0.0_f32; N];

    let outputs = launch(
        ctx,
        program,
        "relu",
        &[BufferSpec::InOut(&input)],
        &[N as u32],
        groups_1d(N),
    )?;
    check_close("relu", &expected, &outputs[0])
}
