use geckoasm::{format_opcodes, CodecConfig, OpcodeFormatter};
use pretty_assertions::assert_eq;

#[test]
fn forward_call_gets_one_label() {
    let listing = "\
00000000:  48000009\tbl\t0x8
00000004:  60000000\tnop
00000008:  38600001\tli\tr3,1
0000000c:  4e800020\tblr
";
    let expected = "\
.loc_0x0:
  bl        .loc_0x8
  nop

.loc_0x8:
  li        r3, 0x1
  blr";
    assert_eq!(format_opcodes(listing), expected);
}

#[test]
fn loop_with_shared_and_ordered_labels() {
    let listing = "\
00000000:  38600000\tli\tr3,0
00000004:  38630001\taddi\tr3,r3,1
00000008:  2C030010\tcmpwi\tr3,16
0000000c:  4180FFF8\tblt\t0x4
00000010:  4082000C\tbne\t0x1c
00000014:  4BFFFFF0\tb\t0x4
00000018:  4E800020\tblr
";
    let expected = "\
.loc_0x0:
  li        r3, 0

.loc_0x4:
  addi      r3, r3, 0x1
  cmpwi     r3, 0x10
  blt       .loc_0x4
  bne       .loc_0x1C
  b         .loc_0x4
  blr

.loc_0x1C:";
    assert_eq!(format_opcodes(listing), expected);
}

#[test]
fn out_of_range_branches_keep_offsets() {
    let listing = "\
00000000:  4BFFFF00\tb\t-0x100
00000004:  41820100\tbeq\tcr0,0x104
00000008:  4E800020\tblr
";
    let expected = "\
.loc_0x0:
  b         -0x100
  beq       cr0, 0x100
  blr";
    assert_eq!(format_opcodes(listing), expected);
}

#[test]
fn immediates_follow_signedness() {
    let listing = "\
00000000:  3C60FFFF\tlis\tr3,-1
00000004:  3863FFFF\taddi\tr3,r3,-1
00000008:  6063FFFF\tori\tr3,r3,65535
0000000c:  8061FFF8\tlwz\tr3,-8(r1)
00000010:  E0230FF8\tpsq_l\tf1,4088(r3),0,0
00000014:  5463103A\trlwinm\tr3,r3,2,0,29
";
    let expected = "\
.loc_0x0:
  lis       r3, 0xFFFF
  addi      r3, r3, -0x1
  ori       r3, r3, 0xFFFF
  lwz       r3, -0x8(r1)
  psq_l     f1,-0x8(r3),0,0
  rlwinm    r3,r3,2,0,29";
    assert_eq!(format_opcodes(listing), expected);
}

#[test]
fn disassembler_quirks_are_rewritten() {
    let listing = "\
00000000:  84600004\tlwzu\tr3,4(r0)
00000004:  4CC63182\tcrclr\t6,6
00000008:  DEADBEEF\t.word\t0xdeadbeef
";
    let expected = "\
.loc_0x0:
  .long     0x84600004
  crclr     6
  .long     0xdeadbeef";
    assert_eq!(format_opcodes(listing), expected);
}

#[test]
fn junk_lines_are_skipped() {
    let listing = "vdappc v1.0\n\n00000000:  4E800020\tblr\nerror: nope\n";
    assert_eq!(format_opcodes(listing), ".loc_0x0:\n  blr");
}

#[test]
fn mnemonic_column_follows_config() {
    let cfg = CodecConfig { mnemonic_width: 6, ..Default::default() };
    let out = OpcodeFormatter::new(&cfg).format("00000000:  38600001\tli\tr3,1\n");
    assert_eq!(out, ".loc_0x0:\n  li    r3, 0x1");
}
