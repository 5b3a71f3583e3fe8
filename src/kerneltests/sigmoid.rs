use crate::diagnostic::Diagnostic;
use crate::gpu::{groups_1d, launch, BufferSpec, GpuContext, KernelProgram};
use crate::harness::compare::check_close;
use crate::harness::data;
use crate::harness::registry::{TestCase, TestSuite};

pub const SUITE: TestSuite = TestSuite {
    name: "sigmoid",
    tests: &[
        TestCase {
            name: "matches_host_reference",
            run: matches_host_reference,
        },
        TestCase {
            name: "saturates_at_extremes",
            run: saturates_at_extremes,
        },
    ],
};

fn matches_host_reference(ctx: &GpuContext, program: &KernelProgram) -> Result<(), Diagnostic> {
    const N: usize = 100;
    let input = data::uniform(N, -5.0, 5.0, 0x5160_0001);
    let expected: Vec<f32> = input.iter().map(|&x| 1.0 / (1.0 + (-x).exp())).collect();

    let outputs = launch(
        ctx,
        program,
        "sigmoid",
        &[BufferSpec::InOut(&input)],
        &[N as u32],
        groups_1d(N),
    )?;
    check_close("sigmoid", &expected, &outputs[0])
}

fn saturates_at_extremes(ctx: &GpuContext, program: &KernelProgram) -> Result<(), Diagnostic> {
    let input = [-20.0_f32, 20.0];
    let expected = [0.0_f32, 1.0];

    let outputs = launch(
        ctx,
        program,
        "sigmoid",
        &[BufferSpec::InOut(&input)],
        &[input.len() as u32],
        groups_1d(input.len()),
    )?;
    check_close("sigmoid", &expected, &outputs[0])
}
