//! Lowering networks to AIGs and reading AIGER back.

use bnet_rs::aig::{write_aag, write_aig, write_network_aag, Aig, AigLit, AigReadOptions, AigWriteOptions};
use bnet_rs::blif::{read_blif_str, BlifReadOptions};
use bnet_rs::iscas89::{read_iscas89_str, Iscas89ReadOptions};
use bnet_rs::netlist::read_netlist_str;
use bnet_rs::network::BnNetwork;

/// Every literal stays below `2 * (M + 1)` and every AND gate only reads
/// variables allocated before it.
fn assert_well_formed(aig: &Aig) {
    let limit = 2 * (aig.max_var() as u32 + 1);
    let first_and = (aig.input_num() + aig.latch_num() + 1) as u32;
    for k in 0..aig.and_num() {
        let lhs = aig.and_lit(k);
        assert_eq!(lhs.var(), first_and + k as u32);
        let (src0, src1) = aig.and_srcs(k);
        for src in [src0, src1] {
            assert!(src.raw() < limit);
            assert!(src.var() < lhs.var(), "AND {:?} reads {:?}", lhs, src);
        }
        assert!(src0 >= src1);
    }
    for i in 0..aig.latch_num() {
        assert!(aig.latch_next(i).raw() < limit);
    }
    for i in 0..aig.output_num() {
        assert!(aig.output(i).raw() < limit);
    }
}

fn patterns(n: usize) -> impl Iterator<Item = Vec<bool>> {
    (0..1usize << n).map(move |p| (0..n).map(|i| (p >> i) & 1 == 1).collect())
}

/// Compares network simulation and AIG evaluation for every input and
/// state vector.
fn assert_equivalent(net: &BnNetwork, aig: &Aig) {
    let ni = net.primary_inputs().len();
    let nl = net.dff_num();
    assert!(ni + nl <= 10);
    for state in patterns(nl) {
        for inputs in patterns(ni) {
            let sim = net.simulate(&inputs, &state).unwrap();
            let (outputs, next) = aig.eval(&inputs, &state);
            assert_eq!(sim.outputs, outputs, "inputs {:?} state {:?}", inputs, state);
            assert_eq!(sim.next_state, next, "inputs {:?} state {:?}", inputs, state);
        }
    }
}

const COVERS: &str = "\
.model covers
.inputs a b c d
.outputs x y z
.names a b t
1- 1
-1 1
.names t c x
10 1
01 1
.names a c d y
1-0 0
-11 0
.names x y d z
111 1
000 1
.end
";

// ─── Encoding ──────────────────────────────────────────────────────────────────

#[test]
fn blif_covers_match_aig() {
    let net = read_blif_str(COVERS, "covers.blif", None, &BlifReadOptions::default()).unwrap();
    let aig = net.to_aig().unwrap();
    assert_well_formed(&aig);
    for inputs in patterns(4) {
        let (a, b, c, d) = (inputs[0], inputs[1], inputs[2], inputs[3]);
        let x = (a || b) != c;
        let y = !((a && !d) || (c && d));
        let z = (x && y && d) || (!x && !y && !d);
        let (outputs, _) = aig.eval(&inputs, &[]);
        assert_eq!(outputs, vec![x, y, z], "a={} b={} c={} d={}", a, b, c, d);
    }
    assert_equivalent(&net, &aig);
}

#[test]
fn wide_gates_match_aig() {
    let text = "INPUT(i0)\nINPUT(i1)\nINPUT(i2)\nINPUT(i3)\nINPUT(i4)\nINPUT(i5)\nINPUT(i6)\nINPUT(i7)\n\
                OUTPUT(p)\nOUTPUT(q)\nOUTPUT(r)\nOUTPUT(m)\n\
                p = XNOR(i0, i1, i2, i3, i4, i5, i6)\n\
                q = NAND(i0, i1, i2, i3, i4)\n\
                r = NOR(i5, i6, i7)\n\
                m = MUX(i0, i1, i2, i3, i4, i5)\n";
    let net = read_iscas89_str(text, "wide.bench", &Iscas89ReadOptions::default()).unwrap();
    let aig = net.to_aig().unwrap();
    assert_well_formed(&aig);
    assert_eq!(aig.input_num(), 8);
    assert_equivalent(&net, &aig);
}

#[test]
fn sequential_bench_matches_aig() {
    let text = "INPUT(G0)\nINPUT(G1)\nOUTPUT(G17)\n\
                G5 = DFF(G10)\nG6 = DFF(G11)\n\
                G10 = NOR(G14, G11)\nG11 = NOT(G0)\n\
                G14 = NAND(G1, G5)\nG15 = OR(G6, G14)\nG17 = XOR(G10, G15)\n";
    let net = read_iscas89_str(text, "seq.bench", &Iscas89ReadOptions::default()).unwrap();
    let aig = net.to_aig().unwrap();
    assert_well_formed(&aig);
    assert_eq!(aig.latch_num(), 2);
    assert_equivalent(&net, &aig);
}

#[test]
fn netlist_with_constants_matches_aig() {
    let text = "module k(a, b, y, z);\ninput a, b;\noutput y, z;\n\
                and (y, a, 1'b1);\nor (z, b, 1'b0, a);\nendmodule\n";
    let net = read_netlist_str(text, "k.v").unwrap();
    let aig = net.to_aig().unwrap();
    assert_well_formed(&aig);
    assert_equivalent(&net, &aig);
}

#[test]
fn not_wrapped_up_is_rejected() {
    let mut net = BnNetwork::new();
    let a = net.new_input("a");
    let o = net.new_output("o");
    net.connect(a, o, 0);
    let mut buf = Vec::new();
    assert!(write_network_aag(&net, &mut buf, &AigWriteOptions::default()).is_err());
    net.wrap_up().unwrap();
    write_network_aag(&net, &mut buf, &AigWriteOptions::default()).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "aag 1 1 0 1 0\n2\n2\ni0 a\no0 o\n");
}

// ─── Reading ───────────────────────────────────────────────────────────────────

#[test]
fn aag_and_aig_read_back() {
    let net = read_blif_str(COVERS, "covers.blif", None, &BlifReadOptions::default()).unwrap();
    let mut aig = net.to_aig().unwrap();
    aig.set_comment(Some("covers\n".to_string()));

    let mut ascii = Vec::new();
    write_aag(&aig, &mut ascii).unwrap();
    assert_eq!(Aig::parse(&ascii, "covers.aag").unwrap(), aig);

    let mut binary = Vec::new();
    write_aig(&aig, &mut binary).unwrap();
    assert_eq!(Aig::parse(&binary, "covers.aig").unwrap(), aig);
}

#[test]
fn network_from_aig_is_equivalent() {
    let text = "INPUT(G0)\nINPUT(G1)\nOUTPUT(G17)\n\
                G5 = DFF(G10)\nG10 = NOR(G14, G0)\n\
                G14 = NAND(G1, G5)\nG17 = XOR(G10, G5)\n";
    let net = read_iscas89_str(text, "seq.bench", &Iscas89ReadOptions::default()).unwrap();
    let aig = net.to_aig().unwrap();

    let back = BnNetwork::from_aig(&aig, &AigReadOptions::default()).unwrap();
    let names: Vec<&str> = back.primary_inputs().iter().map(|&id| back.node(id).name()).collect();
    assert_eq!(names, vec!["G0", "G1", "clock", "clock", "reset"]);
    assert_eq!(back.dffs()[0].name(), "G5");

    // the extra reset port gives the rebuilt network one more input
    for state in patterns(1) {
        for inputs in patterns(3) {
            let (outputs, next) = aig.eval(&inputs, &state);
            let mut extended = inputs.clone();
            extended.extend([false, false]);
            let sim = back.simulate(&extended, &state).unwrap();
            assert_eq!(sim.outputs, outputs);
            assert_eq!(sim.next_state, next);
        }
    }
}

#[test]
fn constant_outputs_survive() {
    let mut aig = Aig::new(1, 0);
    aig.add_output(AigLit::zero());
    aig.add_output(AigLit::one());
    aig.add_output(!aig.input(0));
    let net = BnNetwork::from_aig(&aig, &AigReadOptions::default()).unwrap();
    for inputs in patterns(1) {
        let sim = net.simulate(&inputs, &[]).unwrap();
        assert_eq!(sim.outputs, vec![false, true, !inputs[0]]);
    }
    assert_eq!(net.to_aig().unwrap().eval(&[true], &[]).0, vec![false, true, false]);
}
