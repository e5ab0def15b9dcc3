//! Universal Router command set (v1.2).
//!
//! Indexed by the low five bits of a command byte. Gaps in the numbering are
//! reserved slots with no decoder.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandParam {
    pub name: &'static str,
    pub ty: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub code: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [CommandParam],
}

const fn param(name: &'static str, ty: &'static str, description: &'static str) -> CommandParam {
    CommandParam {
        name,
        ty,
        description,
    }
}

const RECIPIENT: CommandParam = param("recipient", "address", "Address receiving the output");
const TOKEN: CommandParam = param("token", "address", "Token contract address");
const MARKET_VALUE: CommandParam = param("value", "uint256", "Native value forwarded to the market");
const MARKET_DATA: CommandParam = param("data", "bytes", "Call-data forwarded to the market");
const PAYER_IS_USER: CommandParam = param(
    "payerIsUser",
    "bool",
    "Whether input tokens come from the caller rather than the router",
);
const PERMIT_SIGNATURE: CommandParam = param("signature", "bytes", "Owner signature over the permit");

static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        code: 0x00,
        name: "V3_SWAP_EXACT_IN",
        description: "Swap an exact input amount through Uniswap v3 pools",
        params: &[
            RECIPIENT,
            param("amountIn", "uint256", "Exact amount of input token"),
            param("amountOutMin", "uint256", "Minimum acceptable output amount"),
            param("path", "bytes", "Packed v3 swap path"),
            PAYER_IS_USER,
        ],
    },
    CommandSpec {
        code: 0x01,
        name: "V3_SWAP_EXACT_OUT",
        description: "Swap for an exact output amount through Uniswap v3 pools",
        params: &[
            RECIPIENT,
            param("amountOut", "uint256", "Exact amount of output token"),
            param("amountInMax", "uint256", "Maximum input amount to spend"),
            param("path", "bytes", "Packed v3 swap path, output token first"),
            PAYER_IS_USER,
        ],
    },
    CommandSpec {
        code: 0x02,
        name: "PERMIT2_TRANSFER_FROM",
        description: "Transfer tokens from the caller using a Permit2 allowance",
        params: &[
            TOKEN,
            RECIPIENT,
            param("amount", "uint160", "Amount to transfer"),
        ],
    },
    CommandSpec {
        code: 0x03,
        name: "PERMIT2_PERMIT_BATCH",
        description: "Grant Permit2 allowances for several tokens with one signature",
        params: &[
            param(
                "permitBatch",
                "((address token,uint160 amount,uint48 expiration,uint48 nonce)[] details,address spender,uint256 sigDeadline)",
                "Batch of allowances to grant",
            ),
            PERMIT_SIGNATURE,
        ],
    },
    CommandSpec {
        code: 0x04,
        name: "SWEEP",
        description: "Send the router's whole balance of a token to a recipient",
        params: &[
            TOKEN,
            RECIPIENT,
            param("amountMin", "uint160", "Minimum balance required to sweep"),
        ],
    },
    CommandSpec {
        code: 0x05,
        name: "TRANSFER",
        description: "Transfer a fixed amount of a token held by the router",
        params: &[
            TOKEN,
            RECIPIENT,
            param("value", "uint256", "Amount to transfer"),
        ],
    },
    CommandSpec {
        code: 0x06,
        name: "PAY_PORTION",
        description: "Pay a portion of the router's token balance to a recipient",
        params: &[
            TOKEN,
            RECIPIENT,
            param("bips", "uint256", "Portion in basis points"),
        ],
    },
    CommandSpec {
        code: 0x08,
        name: "V2_SWAP_EXACT_IN",
        description: "Swap an exact input amount through Uniswap v2 pairs",
        params: &[
            RECIPIENT,
            param("amountIn", "uint256", "Exact amount of input token"),
            param("amountOutMin", "uint256", "Minimum acceptable output amount"),
            param("path", "address[]", "Token route"),
            PAYER_IS_USER,
        ],
    },
    CommandSpec {
        code: 0x09,
        name: "V2_SWAP_EXACT_OUT",
        description: "Swap for an exact output amount through Uniswap v2 pairs",
        params: &[
            RECIPIENT,
            param("amountOut", "uint256", "Exact amount of output token"),
            param("amountInMax", "uint256", "Maximum input amount to spend"),
            param("path", "address[]", "Token route"),
            PAYER_IS_USER,
        ],
    },
    CommandSpec {
        code: 0x0a,
        name: "PERMIT2_PERMIT",
        description: "Grant a Permit2 allowance with a signature",
        params: &[
            param(
                "permitSingle",
                "((address token,uint160 amount,uint48 expiration,uint48 nonce) details,address spender,uint256 sigDeadline)",
                "Allowance to grant",
            ),
            PERMIT_SIGNATURE,
        ],
    },
    CommandSpec {
        code: 0x0b,
        name: "WRAP_ETH",
        description: "Wrap native ETH held by the router into WETH",
        params: &[
            RECIPIENT,
            param("amountMin", "uint256", "Amount of ETH to wrap"),
        ],
    },
    CommandSpec {
        code: 0x0c,
        name: "UNWRAP_WETH",
        description: "Unwrap the router's WETH into native ETH",
        params: &[
            RECIPIENT,
            param("amountMin", "uint256", "Minimum amount of WETH to unwrap"),
        ],
    },
    CommandSpec {
        code: 0x0d,
        name: "PERMIT2_TRANSFER_FROM_BATCH",
        description: "Transfer several tokens using Permit2 allowances",
        params: &[param(
            "batchDetails",
            "(address from,address to,uint160 amount,address token)[]",
            "Transfers to perform",
        )],
    },
    CommandSpec {
        code: 0x0e,
        name: "BALANCE_CHECK_ERC20",
        description: "Revert unless an owner holds at least a minimum token balance",
        params: &[
            param("owner", "address", "Account whose balance is checked"),
            TOKEN,
            param("minBalance", "uint256", "Required minimum balance"),
        ],
    },
    CommandSpec {
        code: 0x10,
        name: "SEAPORT_V1_5",
        description: "Fill an order on Seaport v1.5",
        params: &[MARKET_VALUE, MARKET_DATA],
    },
    CommandSpec {
        code: 0x11,
        name: "LOOKS_RARE_V2",
        description: "Fill an order on LooksRare v2",
        params: &[MARKET_VALUE, MARKET_DATA],
    },
    CommandSpec {
        code: 0x12,
        name: "NFTX",
        description: "Buy from an NFTX vault",
        params: &[MARKET_VALUE, MARKET_DATA],
    },
    CommandSpec {
        code: 0x13,
        name: "CRYPTOPUNKS",
        description: "Buy a CryptoPunk",
        params: &[
            param("punkId", "uint256", "Punk index"),
            RECIPIENT,
            param("value", "uint256", "Price paid in wei"),
        ],
    },
    CommandSpec {
        code: 0x15,
        name: "OWNER_CHECK_721",
        description: "Revert unless an account owns an ERC-721 token",
        params: &[
            param("owner", "address", "Expected owner"),
            TOKEN,
            param("id", "uint256", "Token id"),
        ],
    },
    CommandSpec {
        code: 0x16,
        name: "OWNER_CHECK_1155",
        description: "Revert unless an account holds enough of an ERC-1155 token",
        params: &[
            param("owner", "address", "Expected holder"),
            TOKEN,
            param("id", "uint256", "Token id"),
            param("minBalance", "uint256", "Required minimum balance"),
        ],
    },
    CommandSpec {
        code: 0x17,
        name: "SWEEP_ERC721",
        description: "Send an ERC-721 token held by the router to a recipient",
        params: &[TOKEN, RECIPIENT, param("id", "uint256", "Token id")],
    },
    CommandSpec {
        code: 0x18,
        name: "X2Y2_721",
        description: "Buy an ERC-721 token on X2Y2",
        params: &[
            MARKET_VALUE,
            MARKET_DATA,
            RECIPIENT,
            TOKEN,
            param("id", "uint256", "Token id"),
        ],
    },
    CommandSpec {
        code: 0x19,
        name: "SUDOSWAP",
        description: "Fill an order on Sudoswap",
        params: &[MARKET_VALUE, MARKET_DATA],
    },
    CommandSpec {
        code: 0x1a,
        name: "NFT20",
        description: "Buy from an NFT20 pool",
        params: &[MARKET_VALUE, MARKET_DATA],
    },
    CommandSpec {
        code: 0x1b,
        name: "X2Y2_1155",
        description: "Buy an ERC-1155 token on X2Y2",
        params: &[
            MARKET_VALUE,
            MARKET_DATA,
            RECIPIENT,
            TOKEN,
            param("id", "uint256", "Token id"),
            param("amount", "uint256", "Quantity to buy"),
        ],
    },
    CommandSpec {
        code: 0x1c,
        name: "FOUNDATION",
        description: "Buy a token on Foundation",
        params: &[
            MARKET_VALUE,
            MARKET_DATA,
            RECIPIENT,
            TOKEN,
            param("id", "uint256", "Token id"),
        ],
    },
    CommandSpec {
        code: 0x1d,
        name: "SWEEP_ERC1155",
        description: "Send ERC-1155 tokens held by the router to a recipient",
        params: &[
            TOKEN,
            RECIPIENT,
            param("id", "uint256", "Token id"),
            param("amount", "uint256", "Quantity to send"),
        ],
    },
    CommandSpec {
        code: 0x1e,
        name: "ELEMENT_MARKET",
        description: "Fill an order on Element",
        params: &[MARKET_VALUE, MARKET_DATA],
    },
];

/// Looks up a command by table index (`command_byte & 0x1f`).
pub fn command(index: u8) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.code == index)
}

pub fn all() -> &'static [CommandSpec] {
    COMMANDS
}
